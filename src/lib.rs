//! JSON模式构建工具库
//!
//! 提供模式树（字段名、类型、必填、嵌套子字段）的不可变变更操作，
//! 以及将模式树物化为示例JSON文档的实时预览。
//! 遵循MVVM架构模式：model 为纯数据与算法，vm 负责命令与渲染。

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::data_core::{AppError, AppState};
pub use model::outline::{build_outline, OutlineRow};
pub use model::schema_tree::{
    append_child, append_root, materialize, remove_node, update_node, FieldType, FieldUpdate,
    NodeId, NodeKind, SchemaNode,
};
pub use vm::bridge::ViewModelBridge;
