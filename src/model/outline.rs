//! 大纲（Outline）：把模式森林压平成按显示顺序排列的行，供展示层逐行渲染

use crate::model::schema_tree::{NodeId, SchemaNode};

/// 一行大纲（与展示解耦）
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineRow {
    pub id: NodeId,
    pub name: String,
    /// 类型文本，未选择类型时为空
    pub type_label: String,
    pub required: bool,
    /// 节点深度（顶层为0，用于缩进）
    pub depth: u32,
    /// 有意义的子节点数量
    pub children: u32,
    /// 类型切走后保留的惰性子节点数量（不单独成行）
    pub inert_children: u32,
    /// 由名称拼出的展示路径，例如 `$.addr['zip code']`
    pub path: String,
}

impl OutlineRow {
    /// 是否可以添加子节点（只有 nested 才提供“+ Child”）
    pub fn accepts_children(&self) -> bool {
        self.type_label == "nested"
    }
}

/// 先序遍历构建大纲
pub fn build_outline(tree: &[SchemaNode]) -> Vec<OutlineRow> {
    let mut out = Vec::with_capacity(64);
    fn segment(name: &str, index: usize) -> String {
        if name.is_empty() {
            format!("[#{}]", index)
        } else if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            format!(".{}", name)
        } else {
            format!("['{}']", name.replace('\'', "\\'"))
        }
    }
    fn walk(out: &mut Vec<OutlineRow>, list: &[SchemaNode], parent_path: &str, depth: u32) {
        for (index, node) in list.iter().enumerate() {
            let path = format!("{}{}", parent_path, segment(&node.name, index));
            out.push(OutlineRow {
                id: node.id.clone(),
                name: node.name.clone(),
                type_label: node.field_type().map(|t| t.to_string()).unwrap_or_default(),
                required: node.required,
                depth,
                children: node.children().len() as u32,
                inert_children: node.inert_children().len() as u32,
                path: path.clone(),
            });
            walk(out, node.children(), &path, depth + 1);
        }
    }

    walk(&mut out, tree, "$", 0);
    out
}
