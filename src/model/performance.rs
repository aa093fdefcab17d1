//! 性能基准测试模块
//!
//! 用于测试大规模模式树的物化、定位变换、级联删除与大纲构建耗时
//! 交互规模（数千节点）下每次操作都应在一帧之内完成

use std::time::Instant;

use crate::model::{
    outline::build_outline,
    schema_tree::{
        collect_ids, count_nodes, materialize, remove_node, update_node, FieldType, FieldUpdate,
        NodeId, SchemaNode,
    },
};

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大型测试森林：每层 `width` 个字段，每隔5个字段一个 nested，宽度逐层减半
pub fn generate_large_schema(depth: usize, width: usize) -> Vec<SchemaNode> {
    fn create_level(prefix: &str, current_depth: usize, max_depth: usize, width: usize) -> Vec<SchemaNode> {
        (0..width)
            .map(|i| {
                let id = format!("{}-{}", prefix, i);
                let node = SchemaNode::with_id(id.as_str()).named(format!("field_{}", i));
                match i % 5 {
                    0 => node.typed(FieldType::String),
                    1 => node.typed(FieldType::Number).marked_required(true),
                    2 => node.typed(FieldType::Boolean),
                    3 => node.typed(FieldType::Array),
                    _ if current_depth + 1 < max_depth => create_level(&id, current_depth + 1, max_depth, width / 2)
                        .into_iter()
                        .fold(node.typed(FieldType::Nested), SchemaNode::with_child),
                    _ => node.typed(FieldType::ObjectId),
                }
            })
            .collect()
    }

    create_level("n", 0, depth, width)
}

/// 测试物化性能
pub fn benchmark_materialize(tree: &[SchemaNode]) -> PerformanceResult {
    let start = Instant::now();
    let doc = materialize(tree);
    let duration = start.elapsed();

    let keys = doc.as_object().map(|m| m.len()).unwrap_or(0);
    PerformanceResult::new(
        "物化预览",
        duration.as_millis(),
        keys > 0 || tree.is_empty(),
        &format!("顶层 {} 个键，共 {} 个节点", keys, count_nodes(tree)),
    )
}

/// 测试定位变换性能（目标为先序最后一个节点，走最长的遍历）
pub fn benchmark_update(tree: &[SchemaNode]) -> PerformanceResult {
    let Some(target) = collect_ids(tree).pop() else {
        return PerformanceResult::new("定位变换", 0, false, "空森林");
    };

    let start = Instant::now();
    let next = update_node(tree, &target, |n| FieldUpdate::name("renamed").apply(n));
    let duration = start.elapsed();

    let success = count_nodes(&next) == count_nodes(tree);
    PerformanceResult::new(
        "定位变换",
        duration.as_millis(),
        success,
        &format!("目标节点: {}", target),
    )
}

/// 测试级联删除性能（删除第一个顶层节点）
pub fn benchmark_remove(tree: &[SchemaNode]) -> PerformanceResult {
    let Some(first) = tree.first() else {
        return PerformanceResult::new("级联删除", 0, false, "空森林");
    };
    let target: NodeId = first.id.clone();

    let start = Instant::now();
    let next = remove_node(tree, &target);
    let duration = start.elapsed();

    let removed = count_nodes(tree) - count_nodes(&next);
    PerformanceResult::new(
        "级联删除",
        duration.as_millis(),
        removed >= 1,
        &format!("移除了 {} 个节点", removed),
    )
}

/// 测试大纲构建性能
pub fn benchmark_outline(tree: &[SchemaNode]) -> PerformanceResult {
    let start = Instant::now();
    let rows = build_outline(tree);
    let duration = start.elapsed();

    PerformanceResult::new(
        "大纲构建",
        duration.as_millis(),
        rows.len() == count_nodes(tree),
        &format!("构建了 {} 行", rows.len()),
    )
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    // 测试不同规模的数据
    let test_cases = [
        (3, 10), // 小型：深度3，宽度10
        (4, 20), // 中型：深度4，宽度20
        (5, 40), // 大型：深度5，宽度40
    ];

    for (depth, width) in test_cases {
        tracing::info!("测试规模：深度{}，宽度{}", depth, width);

        let start = Instant::now();
        let tree = generate_large_schema(depth, width);
        let generation_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("数据生成({}x{})", depth, width),
            generation_time.as_millis(),
            true,
            &format!("生成了 {} 个节点", count_nodes(&tree)),
        ));

        results.push(benchmark_materialize(&tree));
        results.push(benchmark_update(&tree));
        results.push(benchmark_remove(&tree));
        results.push(benchmark_outline(&tree));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_large_schema() {
        let tree = generate_large_schema(3, 10);
        assert_eq!(tree.len(), 10);
        assert!(tree.iter().any(SchemaNode::is_nested));

        // ID 在整棵树中唯一
        let ids = collect_ids(&tree);
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_performance_benchmarks() {
        let tree = generate_large_schema(3, 8);

        for result in [
            benchmark_materialize(&tree),
            benchmark_update(&tree),
            benchmark_remove(&tree),
            benchmark_outline(&tree),
        ] {
            assert!(result.success, "{} 失败: {}", result.operation, result.details);
            assert!(result.duration_ms < 1000); // 应该在1秒内完成
        }
    }

    #[test]
    fn test_benchmarks_on_empty_forest() {
        assert!(!benchmark_update(&[]).success);
        assert!(!benchmark_remove(&[]).success);
        assert!(benchmark_materialize(&[]).success);
    }
}
