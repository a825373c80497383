//! 树引擎（Tree Engine）：扁平路径映射上的展开/折叠状态机与过滤可见性

use std::collections::HashMap;

use serde_json::Value;

use crate::model::path::{
    child_index_path, child_key_path, is_ancestor_or_self, SearchMode, SearchOptions, ROOT_PATH,
};

/// 全局信号：展开全部或折叠全部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    ExpandAll,
    CollapseAll,
}

/// 单调递增的全局展开/折叠命令，tick相同视为同一条命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalExpandSignal {
    pub mode: SignalMode,
    pub tick: u64,
}

/// 展开状态机。映射里没有的路径取默认值：根展开，其余折叠
#[derive(Debug)]
pub struct TreeEngine {
    expansion: HashMap<String, bool>,
    last_applied_tick: Option<u64>,
    /// 搜索时自动展开命中路径的所有祖先
    pub auto_expand_on_search: bool,
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeEngine {
    pub fn new() -> Self {
        Self {
            expansion: HashMap::new(),
            last_applied_tick: None,
            auto_expand_on_search: true,
        }
    }

    /// 换根时调用：清空展开状态与tick记录，不同的根绝不共享状态
    pub fn reset(&mut self) {
        self.expansion.clear();
        self.last_applied_tick = None;
    }

    /// 只翻转这一个路径的本地展开位，祖先与后代都不受影响
    pub fn toggle(&mut self, path: &str) {
        let current = self.local_expansion(path);
        self.expansion.insert(path.to_string(), !current);
    }

    /// 本地展开位（用户手动状态），未记录时根默认展开、其余默认折叠
    pub fn local_expansion(&self, path: &str) -> bool {
        match self.expansion.get(path) {
            Some(state) => *state,
            None => path == ROOT_PATH,
        }
    }

    /// 实际展开判定：本地展开，或开启自动展开且该路径是某个命中的祖先/自身
    pub fn effective_expansion(&self, path: &str, match_set: &[String]) -> bool {
        if self.local_expansion(path) {
            return true;
        }
        self.auto_expand_on_search
            && match_set.iter().any(|hit| is_ancestor_or_self(path, hit))
    }

    /// 过滤可见性。
    /// 过滤关闭时恒可见；内容模式下要求自身或子树里存在命中
    /// （命中集为空时整棵树都被抑制）；路径模式下空命中集视为
    /// "过滤尚未生效"而全部可见，否则命中路径连同其祖先与整个子树可见
    pub fn visible(
        &self,
        path: &str,
        match_set: &[String],
        options: &SearchOptions,
        filter_mode: bool,
    ) -> bool {
        if !filter_mode {
            return true;
        }
        match options.mode {
            SearchMode::Content => match_set
                .iter()
                .any(|hit| is_ancestor_or_self(path, hit)),
            SearchMode::Path => {
                if match_set.is_empty() {
                    return true;
                }
                match_set.iter().any(|hit| {
                    is_ancestor_or_self(path, hit) || is_ancestor_or_self(hit, path)
                })
            }
        }
    }

    /// 执行一条全局信号：从根出发，只改写过滤后仍然显示的容器子节点。
    /// 被过滤隐藏的分支保持原状，根自身的展开位也不动。
    /// 同一tick的信号重复下发会被忽略
    pub fn apply_global_signal(
        &mut self,
        signal: &GlobalExpandSignal,
        root: &Value,
        match_set: &[String],
        options: &SearchOptions,
        filter_mode: bool,
    ) {
        if self.last_applied_tick == Some(signal.tick) {
            return;
        }
        self.last_applied_tick = Some(signal.tick);
        let target = matches!(signal.mode, SignalMode::ExpandAll);
        self.signal_walk(root, ROOT_PATH, target, match_set, options, filter_mode);
    }

    fn signal_walk(
        &mut self,
        value: &Value,
        path: &str,
        target: bool,
        match_set: &[String],
        options: &SearchOptions,
        filter_mode: bool,
    ) {
        match value {
            Value::Object(members) => {
                for (key, child) in members {
                    let child_path = child_key_path(path, key);
                    self.signal_child(child, child_path, target, match_set, options, filter_mode);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    let child_path = child_index_path(path, index);
                    self.signal_child(child, child_path, target, match_set, options, filter_mode);
                }
            }
            _ => {}
        }
    }

    fn signal_child(
        &mut self,
        child: &Value,
        child_path: String,
        target: bool,
        match_set: &[String],
        options: &SearchOptions,
        filter_mode: bool,
    ) {
        if !self.visible(&child_path, match_set, options, filter_mode) {
            return;
        }
        // 展开位只对容器有意义，标量不记
        if matches!(child, Value::Object(_) | Value::Array(_)) {
            self.expansion.insert(child_path.clone(), target);
            self.signal_walk(child, &child_path, target, match_set, options, filter_mode);
        }
    }
}
