//! 命中索引（Match Index）：一次查询在整棵树上的先序有序命中集

use std::collections::HashSet;

use serde_json::Value;

use crate::model::path::{
    child_index_path, child_key_path, matches_path, matches_text, SearchMode, SearchOptions,
    ROOT_PATH,
};
use crate::model::shadow_tree::scalar_text;

/// 计算当前查询的命中路径集，空白查询直接返回空集。
/// 固定先序遍历产出，顺序就是"上一个/下一个"导航的契约；
/// 键名含 `.` 或 `[` 时不同节点会算出同一条路径文本，
/// 这里按路径去重，只保留先序首个，相同输入必得相同输出
pub fn compute_matches(root: &Value, options: &SearchOptions) -> Vec<String> {
    if options.is_blank() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    walk(root, ROOT_PATH, None, options, &mut out, &mut seen);
    out
}

fn walk(
    value: &Value,
    path: &str,
    key: Option<&str>,
    options: &SearchOptions,
    out: &mut Vec<String>,
    seen: &mut HashSet<String>,
) {
    if node_matches(value, path, key, options) && seen.insert(path.to_string()) {
        out.push(path.to_string());
    }
    match value {
        Value::Object(members) => {
            for (member_key, child) in members {
                let child_path = child_key_path(path, member_key);
                walk(child, &child_path, Some(member_key), options, out, seen);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let child_path = child_index_path(path, index);
                walk(child, &child_path, None, options, out, seen);
            }
        }
        _ => {}
    }
}

/// 单个节点的命中判定。
/// 路径模式只看路径文本；内容模式看标量值，对象成员再看键名，
/// 键命中时记的是成员自己的路径（值是容器也一样）
fn node_matches(value: &Value, path: &str, key: Option<&str>, options: &SearchOptions) -> bool {
    match options.mode {
        SearchMode::Path => matches_path(path, &options.query, options.strategy, options.case_sensitive),
        SearchMode::Content => {
            let key_hit = key.map_or(false, |k| {
                matches_text(k, &options.query, options.strategy, options.case_sensitive)
            });
            if key_hit {
                return true;
            }
            scalar_text(value).map_or(false, |text| {
                matches_text(&text, &options.query, options.strategy, options.case_sensitive)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::path::MatchStrategy;
    use serde_json::json;

    fn options(query: &str, mode: SearchMode) -> SearchOptions {
        SearchOptions {
            query: query.to_string(),
            mode,
            ..SearchOptions::default()
        }
    }

    #[test]
    fn test_blank_query_yields_empty_set() {
        let root = json!({"a": 1});
        assert!(compute_matches(&root, &options("", SearchMode::Content)).is_empty());
        assert!(compute_matches(&root, &options("   ", SearchMode::Content)).is_empty());
        assert!(compute_matches(&root, &options("", SearchMode::Path)).is_empty());
    }

    #[test]
    fn test_content_value_match() {
        // 值里带"1"的只有 $.a.b
        let root = json!({"a": {"b": 1}, "c": 2});
        let hits = compute_matches(&root, &options("1", SearchMode::Content));
        assert_eq!(hits, vec!["$.a.b".to_string()]);
    }

    #[test]
    fn test_content_key_match_includes_container_member() {
        // 键名命中时记成员自己的路径，值是容器也照记
        let root = json!({"user": {"name": "张三"}, "id": 7});
        let hits = compute_matches(&root, &options("user", SearchMode::Content));
        assert_eq!(hits, vec!["$.user".to_string()]);
    }

    #[test]
    fn test_content_match_covers_all_scalar_kinds() {
        let root = json!({"s": "abc", "n": 12.5, "b": true, "z": null});
        assert_eq!(
            compute_matches(&root, &options("abc", SearchMode::Content)),
            vec!["$.s".to_string()]
        );
        assert_eq!(
            compute_matches(&root, &options("12.5", SearchMode::Content)),
            vec!["$.n".to_string()]
        );
        assert_eq!(
            compute_matches(&root, &options("true", SearchMode::Content)),
            vec!["$.b".to_string()]
        );
        assert_eq!(
            compute_matches(&root, &options("null", SearchMode::Content)),
            vec!["$.z".to_string()]
        );
    }

    #[test]
    fn test_path_mode_preorder() {
        let root = json!({"a": {"b": 1}, "c": 2});
        let hits = compute_matches(&root, &options("a", SearchMode::Path));
        assert_eq!(hits, vec!["$.a".to_string(), "$.a.b".to_string()]);
    }

    #[test]
    fn test_array_elements_match_on_value_only() {
        // 数组元素没有键名，"items"只命中成员键，元素靠值命中
        let root = json!({"items": ["items", "other"]});
        let hits = compute_matches(&root, &options("items", SearchMode::Content));
        assert_eq!(hits, vec!["$.items".to_string(), "$.items[0]".to_string()]);
    }

    #[test]
    fn test_no_duplicate_when_key_and_value_both_hit() {
        // 键和值同时命中也只记一次
        let root = json!({"name": "name"});
        let hits = compute_matches(&root, &options("name", SearchMode::Content));
        assert_eq!(hits, vec!["$.name".to_string()]);
    }

    #[test]
    fn test_colliding_paths_recorded_once() {
        // 键名带 `.` 时两个不同节点拼出同一条路径，只保留先序首个
        let root = json!({"a.b": "x", "a": {"b": "x"}});
        let hits = compute_matches(&root, &options("x", SearchMode::Content));
        assert_eq!(hits, vec!["$.a.b".to_string()], "重合路径不得重复入集");

        // 键名形如索引段时与数组元素路径同样会重合
        let root = json!({"items[0]": "y", "items": ["y"]});
        let hits = compute_matches(&root, &options("y", SearchMode::Content));
        assert_eq!(hits, vec!["$.items[0]".to_string()]);
    }

    #[test]
    fn test_deterministic_order() {
        let root = json!({"b": {"x": "hit"}, "a": {"y": "hit"}, "list": ["hit"]});
        let opts = options("hit", SearchMode::Content);
        let first = compute_matches(&root, &opts);
        let second = compute_matches(&root, &opts);
        assert_eq!(first, second, "相同输入必须得到相同顺序");
        // 先序且尊重对象插入顺序
        assert_eq!(
            first,
            vec![
                "$.b.x".to_string(),
                "$.a.y".to_string(),
                "$.list[0]".to_string()
            ]
        );
    }

    #[test]
    fn test_regex_strategy_over_paths() {
        let root = json!({"items": [{"id": 1}, {"id": 2}], "id": 0});
        let opts = SearchOptions {
            query: "items[].id".to_string(),
            mode: SearchMode::Path,
            strategy: MatchStrategy::Regex,
            ..SearchOptions::default()
        };
        let hits = compute_matches(&root, &opts);
        assert_eq!(
            hits,
            vec!["$.items[0].id".to_string(), "$.items[1].id".to_string()]
        );
    }

    #[test]
    fn test_invalid_regex_matches_nothing() {
        let root = json!({"a": 1});
        let opts = SearchOptions {
            query: "([".to_string(),
            mode: SearchMode::Content,
            strategy: MatchStrategy::Regex,
            ..SearchOptions::default()
        };
        assert!(compute_matches(&root, &opts).is_empty(), "坏正则退化为无命中");
    }

    #[test]
    fn test_exact_strategy_content() {
        let root = json!({"a": "value", "b": "value-extra"});
        let opts = SearchOptions {
            query: "VALUE".to_string(),
            strategy: MatchStrategy::Exact,
            ..SearchOptions::default()
        };
        let hits = compute_matches(&root, &opts);
        assert_eq!(hits, vec!["$.a".to_string()], "Exact不命中更长的值");
    }
}
