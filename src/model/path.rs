//! 路径模型（Path Model）：节点的文本地址（`$`、`.key`、`[index]`）与统一的搜索匹配规则

use regex::Regex;

/// 根节点路径
pub const ROOT_PATH: &str = "$";

/// 匹配策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// 子串包含（默认）
    Contains,
    /// 完全相等
    Exact,
    /// 正则表达式（查询中的字面 `[]` 视为任意数组索引）
    Regex,
}

/// 搜索对象：节点内容（键/值）或结构路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Content,
    Path,
}

/// 一次搜索的全部参数
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    pub mode: SearchMode,
    pub strategy: MatchStrategy,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            mode: SearchMode::Content,
            strategy: MatchStrategy::Contains,
            case_sensitive: false,
        }
    }
}

impl SearchOptions {
    /// 查询去除首尾空白后是否为空（空查询不产生任何匹配）
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }
}

/// 对象成员的子路径：`parent.key`
pub fn child_key_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

/// 数组元素的子路径：`parent[index]`
pub fn child_index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

/// `ancestor` 是否为 `path` 的祖先或自身。
/// 按段边界判断：前缀之后必须是 `.` 或 `[`，避免 `$.a` 误配 `$.ab`
pub fn is_ancestor_or_self(ancestor: &str, path: &str) -> bool {
    if ancestor == path {
        return true;
    }
    path.starts_with(ancestor)
        && matches!(path.as_bytes().get(ancestor.len()), Some(b'.') | Some(b'['))
}

/// 文本匹配：Contains/Exact 按需做大小写归一化；
/// Regex 编译失败时视为永不匹配（不向上传播错误）
pub fn matches_text(
    candidate: &str,
    query: &str,
    strategy: MatchStrategy,
    case_sensitive: bool,
) -> bool {
    match strategy {
        MatchStrategy::Contains => {
            if case_sensitive {
                candidate.contains(query)
            } else {
                candidate.to_lowercase().contains(&query.to_lowercase())
            }
        }
        MatchStrategy::Exact => {
            if case_sensitive {
                candidate == query
            } else {
                candidate.to_lowercase() == query.to_lowercase()
            }
        }
        MatchStrategy::Regex => match build_query_regex(query, case_sensitive) {
            Some(re) => re.is_match(candidate),
            None => false,
        },
    }
}

/// 路径匹配：Contains/Exact 先对路径与查询两侧剥离 `[数字]` 索引段，
/// 使路径搜索默认与具体索引无关；Regex 在原始路径上匹配，
/// 索引通配由查询里的 `[]` 改写承担
pub fn matches_path(
    path: &str,
    query: &str,
    strategy: MatchStrategy,
    case_sensitive: bool,
) -> bool {
    match strategy {
        MatchStrategy::Regex => matches_text(path, query, strategy, case_sensitive),
        MatchStrategy::Contains | MatchStrategy::Exact => {
            let stripped_path = strip_index_segments(path);
            let stripped_query = strip_index_segments(query);
            matches_text(&stripped_path, &stripped_query, strategy, case_sensitive)
        }
    }
}

/// 删除所有 `[数字]` 索引段：`$.items[3].name` -> `$.items.name`。
/// 非索引形式的方括号（如 `[abc]`、`[]`）原样保留
pub fn strip_index_segments(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b']' {
                // i 与 j+1 都落在ASCII字符上，切片不会切断多字节字符
                out.push_str(&path[start..i]);
                i = j + 1;
                start = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&path[start..]);
    out
}

/// 将用户查询编译为正则：字面 `[]` 改写为 `\[\d+\]`，
/// 不区分大小写时加 `(?i)` 前缀
fn build_query_regex(query: &str, case_sensitive: bool) -> Option<Regex> {
    let pattern = query.replace("[]", r"\[\d+\]");
    let pattern = if case_sensitive {
        pattern
    } else {
        format!("(?i){}", pattern)
    };
    Regex::new(&pattern).ok()
}
