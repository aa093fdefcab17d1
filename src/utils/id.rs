//! 节点ID生成：UUID v4（simple 形式，32位十六进制）

use uuid::Uuid;

use crate::model::schema_tree::NodeId;

/// 生成一个进程内（实际上全局）唯一的节点ID
pub fn new_node_id() -> NodeId {
    NodeId::new(Uuid::new_v4().simple().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<NodeId> = (0..2000).map(|_| new_node_id()).collect();
        assert_eq!(ids.len(), 2000, "2000个ID不应出现碰撞");
    }

    #[test]
    fn test_id_format() {
        let id = new_node_id();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
