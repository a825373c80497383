//! 影子树（Shadow Tree）：从JSON值树投影出的纯渲染结构，只读状态不写状态

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::model::path::{child_index_path, child_key_path, SearchOptions, ROOT_PATH};
use crate::model::tree_engine::TreeEngine;

/// JSON 节点类型（与具体展示解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

/// 渲染投影节点：一帧画面里一行的全部信息
#[derive(Debug, Clone, Serialize)]
pub struct RenderNode {
    /// 节点的规范路径
    pub path: String,
    /// 对象成员的键名；数组元素与根没有键
    pub key: Option<String>,
    /// 节点类型
    pub kind: NodeKind,
    /// 行内文本：标量字面量、折叠摘要或空容器记号；展开的容器为空
    pub display: Option<String>,
    /// 展开容器的可见子节点，结构顺序
    pub children: Vec<RenderNode>,
    /// 是否为容器（可展开折叠）
    pub is_expandable: bool,
    /// 实际展开状态（含搜索自动展开）
    pub is_expanded: bool,
    /// 自身命中当前搜索
    pub is_self_match: bool,
    /// 是当前导航停留的命中
    pub is_active: bool,
    /// 是兄弟里最后一个幸存者（决定要不要跟分隔逗号）
    pub is_last: bool,
}

/// 节点类型判定
pub fn kind_of(value: &Value) -> NodeKind {
    match value {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        Value::String(_) => NodeKind::String,
        Value::Number(_) => NodeKind::Number,
        Value::Bool(_) => NodeKind::Bool,
        Value::Null => NodeKind::Null,
    }
}

/// 标量的匹配文本：字符串取原文，其余取规范字面量。容器没有匹配文本
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        _ => None,
    }
}

/// 标量的展示字面量：字符串带引号，数字/布尔取规范文本，null原样
pub fn display_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(format!("\"{}\"", s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        _ => None,
    }
}

/// 折叠容器的摘要：数组给元素数，对象给键数
pub fn collapsed_preview(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => Some(format!("[{}项]", items.len())),
        Value::Object(members) => Some(format!("{{{}键}}", members.len())),
        _ => None,
    }
}

/// 整棵值树的节点总数（日志与性能统计用）
pub fn count_nodes(value: &Value) -> usize {
    match value {
        Value::Object(members) => 1 + members.values().map(count_nodes).sum::<usize>(),
        Value::Array(items) => 1 + items.iter().map(count_nodes).sum::<usize>(),
        _ => 1,
    }
}

struct ProjectCtx<'a> {
    engine: &'a TreeEngine,
    match_set: &'a [String],
    matched: HashSet<&'a str>,
    options: &'a SearchOptions,
    filter_mode: bool,
    active_path: Option<&'a str>,
}

/// 把当前根投影成渲染树。根自身被过滤掉时返回 `None`（一行都不画）
pub fn project_tree(
    root: &Value,
    engine: &TreeEngine,
    match_set: &[String],
    options: &SearchOptions,
    filter_mode: bool,
    active_path: Option<&str>,
) -> Option<RenderNode> {
    if !engine.visible(ROOT_PATH, match_set, options, filter_mode) {
        return None;
    }
    let ctx = ProjectCtx {
        engine,
        match_set,
        matched: match_set.iter().map(String::as_str).collect(),
        options,
        filter_mode,
        active_path,
    };
    Some(project_node(root, ROOT_PATH.to_string(), None, true, &ctx))
}

fn project_node(
    value: &Value,
    path: String,
    key: Option<String>,
    is_last: bool,
    ctx: &ProjectCtx<'_>,
) -> RenderNode {
    let kind = kind_of(value);
    let is_expandable = matches!(kind, NodeKind::Object | NodeKind::Array);
    let is_expanded = is_expandable && ctx.engine.effective_expansion(&path, ctx.match_set);
    let is_self_match = ctx.matched.contains(path.as_str());
    let is_active = ctx.active_path == Some(path.as_str());

    let mut display = None;
    let mut children = Vec::new();
    if !is_expandable {
        display = display_literal(value);
    } else if !is_expanded {
        display = collapsed_preview(value);
    } else {
        match value {
            Value::Object(members) => {
                if members.is_empty() {
                    display = Some("{}".to_string());
                } else {
                    let survivors: Vec<(String, String, &Value)> = members
                        .iter()
                        .map(|(k, child)| (k.clone(), child_key_path(&path, k), child))
                        .filter(|(_, child_path, _)| {
                            ctx.engine.visible(
                                child_path,
                                ctx.match_set,
                                ctx.options,
                                ctx.filter_mode,
                            )
                        })
                        .collect();
                    let total = survivors.len();
                    for (pos, (k, child_path, child)) in survivors.into_iter().enumerate() {
                        children.push(project_node(
                            child,
                            child_path,
                            Some(k),
                            pos + 1 == total,
                            ctx,
                        ));
                    }
                }
            }
            Value::Array(items) => {
                if items.is_empty() {
                    display = Some("[]".to_string());
                } else {
                    let survivors: Vec<(String, &Value)> = items
                        .iter()
                        .enumerate()
                        .map(|(index, child)| (child_index_path(&path, index), child))
                        .filter(|(child_path, _)| {
                            ctx.engine.visible(
                                child_path,
                                ctx.match_set,
                                ctx.options,
                                ctx.filter_mode,
                            )
                        })
                        .collect();
                    let total = survivors.len();
                    for (pos, (child_path, child)) in survivors.into_iter().enumerate() {
                        children.push(project_node(child, child_path, None, pos + 1 == total, ctx));
                    }
                }
            }
            _ => {}
        }
    }

    RenderNode {
        path,
        key,
        kind,
        display,
        children,
        is_expandable,
        is_expanded,
        is_self_match,
        is_active,
        is_last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn test_root_projection_default_state() {
        let root = json!({"name": "测试", "age": 30});
        let engine = TreeEngine::new();
        let tree = project_tree(&root, &engine, &[], &options(), false, None).unwrap();

        assert_eq!(tree.path, "$");
        assert_eq!(tree.kind, NodeKind::Object);
        assert!(tree.is_expandable);
        assert!(tree.is_expanded, "根默认展开");
        assert!(tree.is_last);
        assert!(tree.display.is_none());
        assert_eq!(tree.children.len(), 2);

        // 子节点保持插入顺序，键与路径齐全
        assert_eq!(tree.children[0].key.as_deref(), Some("name"));
        assert_eq!(tree.children[0].path, "$.name");
        assert_eq!(tree.children[0].display.as_deref(), Some("\"测试\""));
        assert_eq!(tree.children[1].path, "$.age");
        assert_eq!(tree.children[1].display.as_deref(), Some("30"));
    }

    #[test]
    fn test_collapsed_container_preview() {
        let root = json!({"items": [1, 2, 3], "meta": {"a": 1, "b": 2}});
        let engine = TreeEngine::new();
        let tree = project_tree(&root, &engine, &[], &options(), false, None).unwrap();

        // 默认折叠的容器只给摘要，不给子节点
        let items = &tree.children[0];
        assert!(!items.is_expanded);
        assert_eq!(items.display.as_deref(), Some("[3项]"));
        assert!(items.children.is_empty());
        assert_eq!(items.kind, NodeKind::Array);

        let meta = &tree.children[1];
        assert_eq!(meta.display.as_deref(), Some("{2键}"));
    }

    #[test]
    fn test_expanded_children_and_separators() {
        let root = json!({"a": [10, 20], "b": null});
        let mut engine = TreeEngine::new();
        engine.toggle("$.a");
        let tree = project_tree(&root, &engine, &[], &options(), false, None).unwrap();

        let a = &tree.children[0];
        assert!(a.is_expanded);
        assert!(a.display.is_none());
        assert_eq!(a.children.len(), 2);
        assert_eq!(a.children[0].path, "$.a[0]");
        assert!(a.children[0].key.is_none(), "数组元素没有键名");
        assert!(!a.children[0].is_last, "非末位要跟分隔符");
        assert!(a.children[1].is_last);

        assert!(!a.is_last, "a后面还有b");
        assert!(tree.children[1].is_last);
        assert_eq!(tree.children[1].display.as_deref(), Some("null"));
    }

    #[test]
    fn test_empty_containers_render_as_brackets() {
        let root = json!({"arr": [], "obj": {}});
        let mut engine = TreeEngine::new();
        engine.toggle("$.arr");
        engine.toggle("$.obj");
        let tree = project_tree(&root, &engine, &[], &options(), false, None).unwrap();

        assert_eq!(tree.children[0].display.as_deref(), Some("[]"));
        assert_eq!(tree.children[1].display.as_deref(), Some("{}"));
        assert!(tree.children[0].is_expanded);
    }

    #[test]
    fn test_match_flags_and_active_path() {
        let root = json!({"a": {"b": 1}, "c": 2});
        let engine = TreeEngine::new();
        let match_set = vec!["$.a.b".to_string()];
        let tree =
            project_tree(&root, &engine, &match_set, &options(), false, Some("$.a.b")).unwrap();

        let a = &tree.children[0];
        assert!(a.is_expanded, "命中的祖先被自动展开");
        assert!(!a.is_self_match, "祖先本身不算命中");
        let b = &a.children[0];
        assert!(b.is_self_match);
        assert!(b.is_active, "导航停留的命中要单独标出");
        assert!(!tree.children[1].is_active);
    }

    #[test]
    fn test_filter_prunes_branches_and_separator_follows() {
        let root = json!({"a": {"b": 1}, "c": 2, "d": 3});
        let engine = TreeEngine::new();
        // 命中只在a子树里：c、d被过滤，a成为唯一幸存者
        let match_set = vec!["$.a.b".to_string()];
        let opts = SearchOptions {
            query: "1".to_string(),
            ..SearchOptions::default()
        };
        let tree = project_tree(&root, &engine, &match_set, &opts, true, None).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].path, "$.a");
        assert!(tree.children[0].is_last, "幸存者重排后末位标记要跟着变");
    }

    #[test]
    fn test_filter_with_no_matches_renders_nothing() {
        let root = json!({"a": {"b": 1}});
        let engine = TreeEngine::new();
        let opts = SearchOptions {
            query: "zzz".to_string(),
            ..SearchOptions::default()
        };
        assert!(
            project_tree(&root, &engine, &[], &opts, true, None).is_none(),
            "无命中时整棵树一行都不画"
        );
    }

    #[test]
    fn test_scalar_root_projection() {
        let root = json!(42);
        let engine = TreeEngine::new();
        let tree = project_tree(&root, &engine, &[], &options(), false, None).unwrap();
        assert!(!tree.is_expandable);
        assert_eq!(tree.display.as_deref(), Some("42"));
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_count_nodes() {
        let root = json!({"a": {"b": 1}, "c": [1, 2, 3]});
        // 根 + a + b + c + 三个元素
        assert_eq!(count_nodes(&root), 7);
        assert_eq!(count_nodes(&json!(null)), 1);
    }
}
