//! AppState：应用核心状态，一次用户动作对应一个同步操作

use std::path::Path;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;

use crate::model::matches::compute_matches;
use crate::model::normalizer::{is_valid_json, parse, stringify, unwrap_quoted, was_quote_wrapped};
use crate::model::path::{MatchStrategy, SearchMode, SearchOptions};
use crate::model::shadow_tree::{count_nodes, project_tree, RenderNode};
use crate::model::tree_engine::{GlobalExpandSignal, SignalMode, TreeEngine};
use crate::utils::fs::read_text_file;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSON 转换错误: {0}")]
    Serialize(String),
    #[error("状态错误: {0}")]
    State(String),
}

#[derive(Debug, Default)]
pub struct AppState {
    /// 最近一次成功格式化的原始文本（嵌套开关切换时重新解析用）
    pub raw_input: String,
    /// 当前根值；`None` 表示尚未格式化任何输入
    pub dom: Option<Value>,
    /// 原始输入带外层引号包装（复制导出时按原样再包一层）
    pub quote_wrapped: bool,
    /// 是否展开字符串值里内嵌的JSON
    pub expand_nested: bool,
    /// 当前搜索参数
    pub options: SearchOptions,
    /// 过滤模式：只显示与命中相关的分支
    pub filter_mode: bool,
    /// 先序命中集，导航顺序的契约
    pub match_set: Vec<String>,
    /// 树引擎：展开状态与全局信号
    pub engine: TreeEngine,
    active_match: Option<usize>,
    signal_tick: u64,
}

impl AppState {
    /// 格式化输入：去壳、校验、解析，原子替换当前根。
    /// 换根同时清空展开状态并重算命中集
    pub fn format_input(&mut self, raw: &str) -> Result<(), AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::State("请输入有效的 JSON 字符串".into()));
        }
        let unwrapped = unwrap_quoted(raw);
        if !is_valid_json(&unwrapped) {
            return Err(AppError::State("输入的不是有效的JSON字符串".into()));
        }

        let start = Instant::now();
        let value = parse(raw, self.expand_nested)?;
        let nodes = count_nodes(&value);
        self.quote_wrapped = was_quote_wrapped(raw);
        self.raw_input = raw.to_string();
        self.replace_root(value);
        tracing::info!(
            "格式化完成: {} 个节点, 引号包装: {}, 耗时 {}ms",
            nodes,
            self.quote_wrapped,
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// 读取文件原始文本并走同一条格式化流水线
    pub fn load_file(&mut self, p: &Path) -> Result<(), AppError> {
        let raw = read_text_file(p)?;
        self.format_input(&raw)?;
        tracing::info!("已加载文件: {}", p.display());
        Ok(())
    }

    /// 切换嵌套展开后用保存的原文重新解析。
    /// 重解析失败时保持当前根不变，只记一条警告
    pub fn set_expand_nested(&mut self, on: bool) {
        self.expand_nested = on;
        if self.dom.is_none() || self.raw_input.trim().is_empty() {
            return;
        }
        match parse(&self.raw_input, self.expand_nested) {
            Ok(value) => self.replace_root(value),
            Err(e) => tracing::warn!("嵌套展开切换后重解析失败，保持当前状态: {}", e),
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.options.query = query.to_string();
        self.recompute_matches();
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.options.mode = mode;
        self.recompute_matches();
    }

    pub fn set_strategy(&mut self, strategy: MatchStrategy) {
        self.options.strategy = strategy;
        self.recompute_matches();
    }

    pub fn set_case_sensitive(&mut self, on: bool) {
        self.options.case_sensitive = on;
        self.recompute_matches();
    }

    /// 过滤开关只改变渲染投影，不触碰命中集
    pub fn set_filter_mode(&mut self, on: bool) {
        self.filter_mode = on;
    }

    /// 重算命中集并复位导航游标。
    /// 查询、策略、模式或根发生变化后都从这里走一遍
    pub fn recompute_matches(&mut self) {
        self.match_set = match &self.dom {
            Some(root) => compute_matches(root, &self.options),
            None => Vec::new(),
        };
        self.active_match = None;
        if !self.options.is_blank() {
            tracing::info!(
                "找到 {} 个命中, 查询: {}",
                self.match_set.len(),
                self.options.query.trim()
            );
        }
    }

    /// 循环前进到下一个命中，返回新的活动路径
    pub fn next_match(&mut self) -> Option<&str> {
        if self.match_set.is_empty() {
            return None;
        }
        let next = match self.active_match {
            Some(current) => (current + 1) % self.match_set.len(),
            None => 0,
        };
        self.active_match = Some(next);
        self.match_set.get(next).map(String::as_str)
    }

    /// 循环后退到上一个命中，未定位时落到最后一个
    pub fn prev_match(&mut self) -> Option<&str> {
        if self.match_set.is_empty() {
            return None;
        }
        let len = self.match_set.len();
        let prev = match self.active_match {
            Some(current) => (current + len - 1) % len,
            None => len - 1,
        };
        self.active_match = Some(prev);
        self.match_set.get(prev).map(String::as_str)
    }

    pub fn active_match_path(&self) -> Option<&str> {
        self.active_match
            .and_then(|index| self.match_set.get(index))
            .map(String::as_str)
    }

    /// 翻转单个路径的展开状态
    pub fn toggle_path(&mut self, path: &str) {
        self.engine.toggle(path);
    }

    /// 展开所有当前显示的节点
    pub fn expand_all(&mut self) {
        self.send_signal(SignalMode::ExpandAll);
    }

    /// 折叠所有当前显示的节点
    pub fn collapse_all(&mut self) {
        self.send_signal(SignalMode::CollapseAll);
    }

    /// 当前状态的渲染投影；没有根或根被过滤掉时为 `None`
    pub fn render_tree(&self) -> Option<RenderNode> {
        let root = self.dom.as_ref()?;
        project_tree(
            root,
            &self.engine,
            &self.match_set,
            &self.options,
            self.filter_mode,
            self.active_match_path(),
        )
    }

    /// 当前根的两空格缩进文本
    pub fn stringify_current(&self) -> Result<String, AppError> {
        let root = self
            .dom
            .as_ref()
            .ok_or_else(|| AppError::State("尚未格式化任何输入".into()))?;
        stringify(root)
    }

    /// 复制导出的文本：原输入带引号包装时整体再编码成一个字符串字面量
    pub fn clipboard_payload(&self) -> Result<String, AppError> {
        let pretty = self.stringify_current()?;
        if self.quote_wrapped {
            return serde_json::to_string(&pretty).map_err(|e| AppError::Serialize(e.to_string()));
        }
        Ok(pretty)
    }

    fn replace_root(&mut self, value: Value) {
        self.dom = Some(value);
        self.engine.reset();
        self.recompute_matches();
    }

    fn send_signal(&mut self, mode: SignalMode) {
        let Some(root) = &self.dom else {
            return;
        };
        self.signal_tick += 1;
        let signal = GlobalExpandSignal {
            mode,
            tick: self.signal_tick,
        };
        self.engine.apply_global_signal(
            &signal,
            root,
            &self.match_set,
            &self.options,
            self.filter_mode,
        );
    }
}
