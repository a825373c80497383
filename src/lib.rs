//! JSON格式化查看工具库
//!
//! 提供原始文本归一化（引号去壳、大整数保护、嵌套JSON展开）、
//! 内容与路径两种模式的搜索命中、以及可折叠树的渲染投影。
//! 所有操作同步跑完，只有解析失败会以错误形式离开库边界

pub mod model;
pub mod utils;

// 重新导出主要类型
pub use model::data_core::{AppError, AppState};
pub use model::matches::compute_matches;
pub use model::normalizer::{is_valid_json, parse, stringify};
pub use model::path::{MatchStrategy, SearchMode, SearchOptions};
pub use model::shadow_tree::{project_tree, NodeKind, RenderNode};
pub use model::tree_engine::{GlobalExpandSignal, SignalMode, TreeEngine};
