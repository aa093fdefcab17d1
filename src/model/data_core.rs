//! AppState：应用核心状态（模式森林）与预览文档读写

use jsonpath_rust::JsonPath; // 提供 query 扩展
use serde_json::Value;
use thiserror::Error;

use crate::model::outline::{build_outline, OutlineRow};
use crate::model::schema_tree::{
    collect_ids, contains_id, count_nodes, find_node, find_reachable, materialize, push_child,
    push_root, remove_node, update_node, FieldUpdate, NodeId, SchemaNode,
};

/// 当前权威状态：每次用户操作整体替换一次 `fields`
#[derive(Debug, Default)]
pub struct AppState {
    pub fields: Vec<SchemaNode>,
    /// 已提交的状态替换次数
    pub revision: u64,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON序列化失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSONPath错误: {0}")]
    JsonPath(String),
    #[error("未知字段类型: {0}")]
    UnknownType(String),
    #[error("未找到节点: {0}")]
    NodeNotFound(String),
    #[error("节点ID前缀不唯一: {0}")]
    AmbiguousId(String),
    #[error("命令错误: {0}")]
    Command(String),
}

impl AppState {
    pub fn new(fields: Vec<SchemaNode>) -> Self {
        Self { fields, revision: 0 }
    }

    /// 状态替换入口：新森林一次性成为权威状态
    pub fn replace_fields(&mut self, next: Vec<SchemaNode>) {
        self.fields = next;
        self.revision += 1;
        tracing::debug!("状态已替换，版本: {}，节点数: {}", self.revision, self.node_count());
    }

    /// 顶层追加空字段，返回新节点ID
    pub fn add_root(&mut self) -> NodeId {
        let node = SchemaNode::new_empty();
        let id = node.id.clone();
        let next = push_root(&self.fields, node);
        self.replace_fields(next);
        tracing::info!("新增顶层字段: {}", id);
        id
    }

    /// 在父节点下追加空字段；父节点不存在或位于惰性子树中时返回 None，状态不变
    pub fn add_child(&mut self, parent: &NodeId) -> Option<NodeId> {
        if find_reachable(&self.fields, parent).is_none() {
            tracing::debug!("父节点不可达，忽略: {}", parent);
            return None;
        }
        let node = SchemaNode::new_empty();
        let id = node.id.clone();
        let next = push_child(&self.fields, parent, node);
        self.replace_fields(next);
        tracing::info!("新增子字段: {} -> {}", parent, id);
        Some(id)
    }

    /// 对目标字段应用局部更新；目标不可达（不存在或位于惰性子树中）时返回 false，状态不变
    pub fn update_field(&mut self, id: &NodeId, update: FieldUpdate) -> bool {
        if find_reachable(&self.fields, id).is_none() {
            tracing::debug!("更新目标不可达，忽略: {}", id);
            return false;
        }
        let next = update_node(&self.fields, id, move |old| update.apply(old));
        self.replace_fields(next);
        true
    }

    /// 删除字段及其整棵子树；未知ID为空操作
    pub fn delete_field(&mut self, id: &NodeId) {
        if !contains_id(&self.fields, id) {
            tracing::debug!("删除目标不存在，忽略: {}", id);
            return;
        }
        let before = self.node_count();
        let next = remove_node(&self.fields, id);
        self.replace_fields(next);
        tracing::info!("删除字段: {}，共移除 {} 个节点", id, before - self.node_count());
    }

    pub fn node(&self, id: &NodeId) -> Option<&SchemaNode> {
        find_node(&self.fields, id)
    }

    pub fn node_count(&self) -> usize {
        count_nodes(&self.fields)
    }

    /// 按前缀解析节点ID（完整ID优先）
    pub fn resolve_id(&self, prefix: &str) -> Result<NodeId, AppError> {
        if prefix.is_empty() {
            return Err(AppError::NodeNotFound(String::new()));
        }
        let exact = NodeId::from(prefix);
        if contains_id(&self.fields, &exact) {
            return Ok(exact);
        }
        let mut hits = collect_ids(&self.fields)
            .into_iter()
            .filter(|id| id.as_str().starts_with(prefix));
        match (hits.next(), hits.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(AppError::AmbiguousId(prefix.to_string())),
            (None, _) => Err(AppError::NodeNotFound(prefix.to_string())),
        }
    }

    pub fn outline(&self) -> Vec<OutlineRow> {
        build_outline(&self.fields)
    }

    /// 实时预览文档（每次调用重新物化）
    pub fn preview(&self) -> Value {
        materialize(&self.fields)
    }

    pub fn preview_pretty(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(&self.preview())?)
    }

    /// 按 JSONPath 提取预览文档中第一个匹配节点的 pretty 字符串
    pub fn extract_preview_pretty(&self, json_path: &str) -> Result<String, AppError> {
        let doc = self.preview();
        let hits: Vec<&Value> = doc
            .query(json_path)
            .map_err(|e| AppError::JsonPath(e.to_string()))?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| AppError::JsonPath("未匹配到任何节点".into()))?;
        Ok(serde_json::to_string_pretty(first)?)
    }

    /// 提交占位：只记录当前预览文档
    pub fn submit(&self) -> Result<String, AppError> {
        let doc = serde_json::to_string(&self.preview())?;
        tracing::info!("提交模式: {}", doc);
        Ok(doc)
    }
}
