//! 模式树（Schema Tree）：字段节点数据模型与四个核心操作
//!
//! 所有操作都是纯函数：输入旧森林，返回新森林，旧树不做原地修改。
//! 调用方（AppState）用一次整体赋值替换状态。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::data_core::AppError;
use crate::utils::id::new_node_id;

/// 节点唯一标识：创建时分配，生命周期内不变，不复用
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// 字段类型（封闭枚举，文本形式与预览 JSON 一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    Number,
    Float,
    Boolean,
    ObjectId,
    Array,
    Nested,
}

impl FieldType {
    /// 下拉框展示顺序
    pub const ALL: [FieldType; 7] = [
        FieldType::Nested,
        FieldType::Number,
        FieldType::String,
        FieldType::ObjectId,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::Array,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::ObjectId => "objectId",
            FieldType::Array => "array",
            FieldType::Nested => "nested",
        }
    }

    /// 叶子类型对应的示例值；nested 的值由子节点决定，这里只给出空对象
    pub fn sample_value(self) -> Value {
        match self {
            FieldType::String => Value::String("STRING".into()),
            FieldType::Number | FieldType::Float => Value::String("NUMBER".into()),
            FieldType::Boolean => Value::String("BOOLEAN".into()),
            FieldType::ObjectId => Value::String("OBJECT_ID".into()),
            FieldType::Array => Value::Array(Vec::new()),
            FieldType::Nested => Value::Object(Map::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::UnknownType(s.to_string()))
    }
}

/// 节点形态：只有 Nested 的子节点参与物化
///
/// 类型从 nested 切走时，子节点移入 `Leaf::inert_children` 保存，
/// 切回 nested 后原样恢复。
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf {
        field_type: Option<FieldType>,
        inert_children: Vec<SchemaNode>,
    },
    Nested {
        children: Vec<SchemaNode>,
    },
}

impl NodeKind {
    fn from_parts(field_type: Option<FieldType>, children: Vec<SchemaNode>) -> Self {
        match field_type {
            Some(FieldType::Nested) => NodeKind::Nested { children },
            other => NodeKind::Leaf {
                field_type: other,
                inert_children: children,
            },
        }
    }

    fn into_children(self) -> Vec<SchemaNode> {
        match self {
            NodeKind::Leaf { inert_children, .. } => inert_children,
            NodeKind::Nested { children } => children,
        }
    }
}

/// 模式树中的一个字段
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub id: NodeId,
    pub name: String,
    /// 仅用于展示，不影响物化
    pub required: bool,
    kind: NodeKind,
}

impl SchemaNode {
    /// 新建空节点：空名称、未选类型、非必填、无子节点
    pub fn new_empty() -> Self {
        Self::with_id(new_node_id())
    }

    pub fn with_id(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            required: false,
            kind: NodeKind::Leaf {
                field_type: None,
                inert_children: Vec::new(),
            },
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn typed(mut self, field_type: FieldType) -> Self {
        self.set_field_type(Some(field_type));
        self
    }

    pub fn marked_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.children_mut().push(child);
        self
    }

    pub fn field_type(&self) -> Option<FieldType> {
        match &self.kind {
            NodeKind::Leaf { field_type, .. } => *field_type,
            NodeKind::Nested { .. } => Some(FieldType::Nested),
        }
    }

    /// 修改类型；子节点序列随之在两种形态间移动，不会丢弃
    pub fn set_field_type(&mut self, field_type: Option<FieldType>) {
        let placeholder = NodeKind::Leaf {
            field_type: None,
            inert_children: Vec::new(),
        };
        let children = std::mem::replace(&mut self.kind, placeholder).into_children();
        self.kind = NodeKind::from_parts(field_type, children);
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, NodeKind::Nested { .. })
    }

    /// 有意义的子节点（仅 nested 时非空）
    pub fn children(&self) -> &[SchemaNode] {
        match &self.kind {
            NodeKind::Nested { children } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    /// 类型切走后保留下来的惰性子节点
    pub fn inert_children(&self) -> &[SchemaNode] {
        match &self.kind {
            NodeKind::Leaf { inert_children, .. } => inert_children,
            NodeKind::Nested { .. } => &[],
        }
    }

    /// 当前形态下存储的子节点序列（无论是否有意义）
    pub fn children_mut(&mut self) -> &mut Vec<SchemaNode> {
        match &mut self.kind {
            NodeKind::Leaf { inert_children, .. } => inert_children,
            NodeKind::Nested { children } => children,
        }
    }

    /// 该节点在预览文档中的示例值
    pub fn sample_value(&self) -> Value {
        match &self.kind {
            NodeKind::Nested { children } => materialize(children),
            NodeKind::Leaf { field_type: None, .. } => Value::String(String::new()),
            NodeKind::Leaf {
                field_type: Some(t), ..
            } => t.sample_value(),
        }
    }

    fn with_kind(&self, kind: NodeKind) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            required: self.required,
            kind,
        }
    }
}

/// 字段的局部更新，缺省的字段保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    pub name: Option<String>,
    /// `Some(None)` 表示清空类型
    pub field_type: Option<Option<FieldType>>,
    pub required: Option<bool>,
}

impl FieldUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn field_type(field_type: Option<FieldType>) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Self::default()
        }
    }

    /// 浅合并到旧节点上
    pub fn apply(self, mut node: SchemaNode) -> SchemaNode {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(field_type) = self.field_type {
            node.set_field_type(field_type);
        }
        if let Some(required) = self.required {
            node.required = required;
        }
        node
    }
}

/// 定位并变换：对 id 匹配的节点应用 `transform`，祖先链上的 nested 节点随之重建
///
/// 只下探 nested 子节点；找不到 id 时返回与输入相等的森林。
/// 即使存在重复 id，也只会变换第一个匹配节点。
pub fn update_node<F>(tree: &[SchemaNode], id: &NodeId, transform: F) -> Vec<SchemaNode>
where
    F: FnOnce(SchemaNode) -> SchemaNode,
{
    let mut transform = Some(transform);
    update_in(tree, id, &mut transform)
}

fn update_in<F>(list: &[SchemaNode], id: &NodeId, transform: &mut Option<F>) -> Vec<SchemaNode>
where
    F: FnOnce(SchemaNode) -> SchemaNode,
{
    list.iter()
        .map(|node| {
            if transform.is_none() {
                return node.clone();
            }
            if node.id == *id {
                return match transform.take() {
                    Some(f) => f(node.clone()),
                    None => node.clone(),
                };
            }
            match &node.kind {
                NodeKind::Nested { children } => node.with_kind(NodeKind::Nested {
                    children: update_in(children, id, transform),
                }),
                NodeKind::Leaf { .. } => node.clone(),
            }
        })
        .collect()
}

/// 定位并删除：移除 id 匹配的节点及其整棵子树（级联删除）
///
/// 惰性子节点同样会被搜索；找不到 id 时为空操作。
pub fn remove_node(tree: &[SchemaNode], id: &NodeId) -> Vec<SchemaNode> {
    tree.iter()
        .filter(|node| node.id != *id)
        .map(|node| {
            let kind = match &node.kind {
                NodeKind::Nested { children } => NodeKind::Nested {
                    children: remove_node(children, id),
                },
                NodeKind::Leaf {
                    field_type,
                    inert_children,
                } => NodeKind::Leaf {
                    field_type: *field_type,
                    inert_children: remove_node(inert_children, id),
                },
            };
            node.with_kind(kind)
        })
        .collect()
}

/// 在顶层末尾追加一个新的空节点
pub fn append_root(tree: &[SchemaNode]) -> Vec<SchemaNode> {
    push_root(tree, SchemaNode::new_empty())
}

/// 在父节点子序列末尾追加一个新的空节点；不校验父节点类型
pub fn append_child(tree: &[SchemaNode], parent_id: &NodeId) -> Vec<SchemaNode> {
    push_child(tree, parent_id, SchemaNode::new_empty())
}

/// 将已构造好的节点追加到顶层末尾
pub fn push_root(tree: &[SchemaNode], node: SchemaNode) -> Vec<SchemaNode> {
    let mut next = Vec::with_capacity(tree.len() + 1);
    next.extend_from_slice(tree);
    next.push(node);
    next
}

/// 将已构造好的节点追加为 `parent_id` 的最后一个子节点
pub fn push_child(tree: &[SchemaNode], parent_id: &NodeId, node: SchemaNode) -> Vec<SchemaNode> {
    update_node(tree, parent_id, move |mut parent| {
        parent.children_mut().push(node);
        parent
    })
}

/// 物化：把森林转换为示例 JSON 对象
///
/// 名称原样作为键（包括空字符串）；同层重名时后者覆盖前者。
pub fn materialize(tree: &[SchemaNode]) -> Value {
    let mut doc = Map::new();
    for node in tree {
        doc.insert(node.name.clone(), node.sample_value());
    }
    Value::Object(doc)
}

/// 在整棵树（含惰性子节点）中查找节点
pub fn find_node<'a>(tree: &'a [SchemaNode], id: &NodeId) -> Option<&'a SchemaNode> {
    for node in tree {
        if node.id == *id {
            return Some(node);
        }
        let stored = match &node.kind {
            NodeKind::Nested { children } => children,
            NodeKind::Leaf { inert_children, .. } => inert_children,
        };
        if let Some(found) = find_node(stored, id) {
            return Some(found);
        }
    }
    None
}

/// 只沿 nested 子节点查找，即定位变换能到达的节点
pub fn find_reachable<'a>(tree: &'a [SchemaNode], id: &NodeId) -> Option<&'a SchemaNode> {
    tree.iter().find_map(|node| {
        if node.id == *id {
            Some(node)
        } else {
            find_reachable(node.children(), id)
        }
    })
}

pub fn contains_id(tree: &[SchemaNode], id: &NodeId) -> bool {
    find_node(tree, id).is_some()
}

/// 先序收集所有节点 id（含惰性子节点）
pub fn collect_ids(tree: &[SchemaNode]) -> Vec<NodeId> {
    fn walk(list: &[SchemaNode], out: &mut Vec<NodeId>) {
        for node in list {
            out.push(node.id.clone());
            walk(node.children(), out);
            walk(node.inert_children(), out);
        }
    }
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

pub fn count_nodes(tree: &[SchemaNode]) -> usize {
    tree.iter()
        .map(|node| 1 + count_nodes(node.children()) + count_nodes(node.inert_children()))
        .sum()
}
