pub mod data_core;
pub mod outline;
pub mod performance;
pub mod schema_tree;
