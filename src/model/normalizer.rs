//! 归一化（Normalizer）：把粘贴进来的原始文本整理成规范JSON值
//!
//! 流水线分三步：去掉最外层的引号包装，给超长整数打 `[BigInt]` 标记，
//! 再做结构解析与按需的嵌套展开。只有解析失败会返回错误

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::model::data_core::AppError;
use crate::model::nested::expand_nested_values;

/// 大整数标记前缀：值以它开头的字符串表示一个被保护的整数字面量
pub const BIG_INT_TAG: &str = "[BigInt]";

/// 成员值位置上16位及以上的整数字面量。
/// 三个捕获组分别是 `键尾引号与冒号`、`数字串`、`后随的逗号或右括号`，
/// 替换时原样拼回两侧并给数字加引号与标记
const BIG_INT_PATTERN: &str = r#"([^\\]":\s*)([0-9]{16,})(\s*[,}])"#;
const BIG_INT_REPLACEMENT: &str = "${1}\"[BigInt]${2}\"${3}";

static BIG_INT_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn big_int_regex() -> Option<&'static Regex> {
    BIG_INT_RE
        .get_or_init(|| Regex::new(BIG_INT_PATTERN).ok())
        .as_ref()
}

/// 把16位及以上的整数成员值改写为 `"[BigInt]数字"` 形式的字符串。
/// 改写发生在结构解析之前，唯一目的就是保住精度
pub fn tag_big_integers(text: &str) -> String {
    match big_int_regex() {
        Some(re) => re.replace_all(text, BIG_INT_REPLACEMENT).into_owned(),
        None => text.to_string(),
    }
}

/// 去除被双引号整体包裹的JSON外壳。
/// 例如 `"{\"a\":1}"` 或未转义的 `"{"a":1}"` 都还原为 `{"a":1}`；
/// 不满足包裹特征时返回去除首尾空白后的原文
pub fn unwrap_quoted(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() > 2 {
        match serde_json::from_str::<Value>(trimmed) {
            // 标准路径：整体就是合法的字符串字面量，且内容像一段JSON
            Ok(Value::String(inner)) => {
                if looks_like_container(&inner) {
                    return inner;
                }
            }
            Ok(_) => {}
            // 内部引号未转义时字面量解析会失败，改为手工去掉首尾引号再验证
            Err(_) => {
                let content = &trimmed[1..trimmed.len() - 1];
                if looks_like_container(content)
                    && serde_json::from_str::<Value>(content).is_ok()
                {
                    return content.to_string();
                }
            }
        }
    }
    trimmed.to_string()
}

/// 判断文本是否为有效JSON：
/// 先做形状预检（花括号/方括号成对，或引号包裹后递归判定），再真正解析。
/// 形状不符时直接判否，不做解析尝试
pub fn is_valid_json(text: &str) -> bool {
    let trimmed = text.trim();
    if !looks_like_container(trimmed) {
        if trimmed.starts_with('"') && trimmed.ends_with('"') {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::String(inner)) => return is_valid_json(&inner),
                Ok(_) => return false,
                Err(_) => {
                    if trimmed.len() > 2 {
                        let content = &trimmed[1..trimmed.len() - 1];
                        if looks_like_container(content) {
                            return serde_json::from_str::<Value>(content).is_ok();
                        }
                    }
                    return false;
                }
            }
        }
        return false;
    }
    serde_json::from_str::<Value>(trimmed).is_ok()
}

/// 解析入口：去壳、打大数标记、结构解析，按需嵌套展开
pub fn parse(raw: &str, expand_nested: bool) -> Result<Value, AppError> {
    let unwrapped = unwrap_quoted(raw);
    let tagged = tag_big_integers(&unwrapped);
    let value: Value = serde_json::from_str(&tagged)?;
    if expand_nested {
        return Ok(expand_nested_values(value));
    }
    Ok(value)
}

/// 两空格缩进的规范化输出。
/// 流水线产出的值不含环与不可序列化内容，失败分支实际不会走到
pub fn stringify(value: &Value) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Serialize(e.to_string()))
}

/// 原始输入是否带外层引号包装（复制导出时据此决定要不要重新包一层）
pub fn was_quote_wrapped(raw: &str) -> bool {
    unwrap_quoted(raw) != raw.trim()
}

/// 首尾是否为成对的 `{}` 或 `[]`（不做trim，调用方自行决定）
fn looks_like_container(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}'))
        || (text.starts_with('[') && text.ends_with(']'))
}
