//! 嵌套展开（Nested-Expander）：把字符串叶子里内嵌的JSON递归还原为结构，失败原样保留

use serde_json::Value;

use crate::model::normalizer::{is_valid_json, tag_big_integers};

/// 后序遍历整个值，重建数组与对象并保持键的插入顺序。
/// 形如 `{"payload": "{\"x\":true}"}` 的叶子会被替换为解析出的子树
pub fn expand_nested_values(value: Value) -> Value {
    match value {
        Value::String(text) => expand_string_leaf(text),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(expand_nested_values).collect())
        }
        Value::Object(members) => Value::Object(
            members
                .into_iter()
                .map(|(key, child)| (key, expand_nested_values(child)))
                .collect(),
        ),
        scalar => scalar,
    }
}

/// 字符串叶子的展开：形状预检通过才尝试解析。
/// 解析出来的结果继续递归展开，多层编码会逐层剥掉
fn expand_string_leaf(text: String) -> Value {
    if !is_valid_json(&text) {
        return Value::String(text);
    }
    let tagged = tag_big_integers(&text);
    match serde_json::from_str::<Value>(&tagged) {
        Ok(parsed) => expand_nested_values(parsed),
        Err(_) => Value::String(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expands_object_member() {
        let value = json!({"payload": "{\"x\":true}"});
        let expanded = expand_nested_values(value);
        assert_eq!(expanded, json!({"payload": {"x": true}}));
    }

    #[test]
    fn test_expands_array_element() {
        let value = json!(["[1,2]", "plain"]);
        let expanded = expand_nested_values(value);
        assert_eq!(expanded, json!([[1, 2], "plain"]));
    }

    #[test]
    fn test_expands_recursively() {
        // 两层编码：外层字符串里还藏着一层
        let inner = "{\"deep\":\"{\\\"n\\\":1}\"}";
        let value = json!({ "wrap": inner });
        let expanded = expand_nested_values(value);
        assert_eq!(expanded, json!({"wrap": {"deep": {"n": 1}}}));
    }

    #[test]
    fn test_keeps_non_json_strings() {
        let value = json!({"a": "hello", "b": "123", "c": "{broken"});
        let expanded = expand_nested_values(value.clone());
        assert_eq!(expanded, value, "非JSON字符串必须原样保留");
    }

    #[test]
    fn test_keeps_scalars_untouched() {
        let value = json!({"n": 1.5, "b": false, "z": null});
        assert_eq!(expand_nested_values(value.clone()), value);
    }

    #[test]
    fn test_big_integers_protected_inside_nested() {
        let value = json!({"resp": "{\"id\": 12345678901234567}"});
        let expanded = expand_nested_values(value);
        assert_eq!(
            expanded,
            json!({"resp": {"id": "[BigInt]12345678901234567"}})
        );
    }
}
