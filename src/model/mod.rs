//! 核心模型层：归一化、嵌套展开、路径与命中、树引擎与应用状态

pub mod data_core;
pub mod matches;
pub mod nested;
pub mod normalizer;
pub mod path;
pub mod performance;
pub mod shadow_tree;
pub mod tree_engine;
