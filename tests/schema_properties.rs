//! 模式树不变量的属性测试与示例场景

use proptest::prelude::*;
use serde_json::json;

use schema_builder::build_outline;
use schema_builder::model::schema_tree::{
    append_child, append_root, collect_ids, count_nodes, find_node, materialize, push_child,
    push_root, remove_node, update_node, FieldType, FieldUpdate, NodeId, SchemaNode,
};

const TYPES: [Option<FieldType>; 8] = [
    None,
    Some(FieldType::String),
    Some(FieldType::Number),
    Some(FieldType::Float),
    Some(FieldType::Boolean),
    Some(FieldType::ObjectId),
    Some(FieldType::Array),
    Some(FieldType::Nested),
];

/// 按操作序列构建森林：追加顶层、追加子节点或修改某节点类型（可能留下惰性子节点）
fn build_forest(ops: &[(u8, usize, usize)]) -> Vec<SchemaNode> {
    let mut tree: Vec<SchemaNode> = Vec::new();
    for (i, &(op, pick, ty)) in ops.iter().enumerate() {
        let ids = collect_ids(&tree);
        let mut node = SchemaNode::with_id(NodeId::new(format!("n{}", i))).named(format!("f{}", pick % 4));
        node.set_field_type(TYPES[ty % TYPES.len()]);

        tree = match op % 3 {
            _ if ids.is_empty() => push_root(&tree, node),
            0 => push_root(&tree, node),
            1 => {
                let parent = &ids[pick % ids.len()];
                let nested = update_node(&tree, parent, |p| {
                    FieldUpdate::field_type(Some(FieldType::Nested)).apply(p)
                });
                push_child(&nested, parent, node)
            }
            _ => {
                let target = &ids[pick % ids.len()];
                update_node(&tree, target, |n| FieldUpdate::field_type(TYPES[ty % TYPES.len()]).apply(n))
            }
        };
    }
    tree
}

fn ops_strategy() -> impl Strategy<Value = Vec<(u8, usize, usize)>> {
    proptest::collection::vec((any::<u8>(), 0..64usize, 0..8usize), 1..40)
}

/// 是否可经由 nested 链到达（变换只会下探这些节点）
fn reachable(tree: &[SchemaNode], id: &NodeId) -> bool {
    build_outline(tree).iter().any(|row| row.id == *id)
}

proptest! {
    #[test]
    fn prop_append_never_reuses_ids(ops in ops_strategy(), pick in 0..64usize) {
        let tree = build_forest(&ops);
        let before = collect_ids(&tree);

        let with_root = append_root(&tree);
        let after = collect_ids(&with_root);
        prop_assert_eq!(after.len(), before.len() + 1);
        let added = &with_root.last().unwrap().id;
        prop_assert!(!before.contains(added));

        let parent = &before[pick % before.len()];
        let with_child = append_child(&tree, parent);
        let mut ids = collect_ids(&with_child);
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }

    #[test]
    fn prop_transform_is_local(ops in ops_strategy(), pick in 0..64usize) {
        let tree = build_forest(&ops);
        let ids = collect_ids(&tree);
        let target = ids[pick % ids.len()].clone();

        let next = update_node(&tree, &target, |n| FieldUpdate::name("__changed__").apply(n));

        if reachable(&tree, &target) {
            prop_assert_eq!(&find_node(&next, &target).unwrap().name, "__changed__");
        } else {
            prop_assert_eq!(&next, &tree);
        }
        prop_assert_eq!(count_nodes(&next), count_nodes(&tree));

        // 不包含目标的顶层子树完全不变
        for (old, new) in tree.iter().zip(next.iter()) {
            if find_node(std::slice::from_ref(old), &target).is_none() {
                prop_assert_eq!(old, new);
            }
        }
        // 其他节点的内容不变
        for id in ids.iter().filter(|id| **id != target) {
            let (old, new) = (find_node(&tree, id).unwrap(), find_node(&next, id).unwrap());
            prop_assert_eq!(&old.name, &new.name);
            prop_assert_eq!(old.field_type(), new.field_type());
            prop_assert_eq!(old.required, new.required);
        }
    }

    #[test]
    fn prop_remove_cascades(ops in ops_strategy(), pick in 0..64usize) {
        let tree = build_forest(&ops);
        let ids = collect_ids(&tree);
        let target = ids[pick % ids.len()].clone();
        let subtree = collect_ids(std::slice::from_ref(find_node(&tree, &target).unwrap()));

        let next = remove_node(&tree, &target);

        for id in &subtree {
            prop_assert!(find_node(&next, id).is_none());
        }
        prop_assert_eq!(count_nodes(&next), count_nodes(&tree) - subtree.len());
        for id in ids.iter().filter(|id| !subtree.contains(id)) {
            prop_assert!(find_node(&next, id).is_some());
        }
    }

    #[test]
    fn prop_missing_id_is_noop(ops in ops_strategy()) {
        let tree = build_forest(&ops);
        let missing = NodeId::from("missing");

        prop_assert_eq!(&update_node(&tree, &missing, |n| n.named("x")), &tree);
        prop_assert_eq!(&remove_node(&tree, &missing), &tree);
    }

    #[test]
    fn prop_materialize_is_pure(ops in ops_strategy()) {
        let tree = build_forest(&ops);
        let first = materialize(&tree);
        prop_assert!(first.is_object());
        prop_assert_eq!(first, materialize(&tree));
    }
}

#[test]
fn test_scenario_empty_forest() {
    assert_eq!(materialize(&[]), json!({}));
}

#[test]
fn test_scenario_leaf_values() {
    let age = vec![SchemaNode::with_id("a").named("age").typed(FieldType::Number)];
    assert_eq!(materialize(&age), json!({"age": "NUMBER"}));

    let tags = vec![SchemaNode::with_id("t").named("tags").typed(FieldType::Array)];
    assert_eq!(materialize(&tags), json!({"tags": []}));
}

#[test]
fn test_scenario_nested() {
    let tree = vec![SchemaNode::with_id("addr")
        .named("addr")
        .typed(FieldType::Nested)
        .with_child(SchemaNode::with_id("city").named("city").typed(FieldType::String))];
    assert_eq!(materialize(&tree), json!({"addr": {"city": "STRING"}}));
}

#[test]
fn test_scenario_duplicate_names() {
    let tree = vec![
        SchemaNode::with_id("1").named("x").typed(FieldType::String),
        SchemaNode::with_id("2").named("x").typed(FieldType::Number),
    ];
    assert_eq!(materialize(&tree), json!({"x": "NUMBER"}));
}

#[test]
fn test_scenario_append_then_remove_child() {
    let tree = vec![SchemaNode::with_id("P").named("p").typed(FieldType::Nested)];
    let parent = NodeId::from("P");

    let with_child = append_child(&tree, &parent);
    let child = find_node(&with_child, &parent).unwrap().children()[0].id.clone();
    let back = remove_node(&with_child, &child);

    assert!(find_node(&back, &parent).unwrap().children().is_empty());
    assert_eq!(back, tree);
}

#[test]
fn test_deeply_nested_materialize() {
    let mut node = SchemaNode::with_id("leaf").named("leaf").typed(FieldType::Boolean);
    for depth in 0..200 {
        node = SchemaNode::with_id(NodeId::new(format!("d{}", depth)))
            .named("level")
            .typed(FieldType::Nested)
            .with_child(node);
    }
    let tree = vec![node];

    let mut doc = &materialize(&tree);
    for _ in 0..200 {
        doc = &doc["level"];
    }
    assert_eq!(doc, &json!({"leaf": "BOOLEAN"}));
}
