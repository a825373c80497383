//! 性能基准测试模块
//!
//! 覆盖解析流水线、命中计算与树投影三条主路径。
//! 目标：中等规模文档（几万节点）上每个用户动作都应在百毫秒级完成

use std::time::Instant;

use serde_json::{json, Value};

use crate::model::matches::compute_matches;
use crate::model::normalizer;
use crate::model::path::SearchOptions;
use crate::model::shadow_tree::{count_nodes, project_tree, RenderNode};
use crate::model::tree_engine::{GlobalExpandSignal, SignalMode, TreeEngine};

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大型测试JSON文档。
/// 字段类型轮换覆盖全部标量，并故意埋入嵌套编码的JSON字符串
/// 与16位以上的大整数，让流水线的每一步都有活干
pub fn generate_large_document(depth: usize, width: usize) -> Value {
    fn create_nested_object(current_depth: usize, max_depth: usize, width: usize) -> Value {
        if current_depth >= max_depth {
            return json!("叶子节点值");
        }

        let mut obj = serde_json::Map::new();
        for i in 0..width {
            let key = format!("field_{}", i);
            let value = match i % 6 {
                0 => json!(format!("字符串值_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => json!([1, 2, 3, i]),
                4 => create_nested_object(current_depth + 1, max_depth, width / 2),
                // 嵌套编码的JSON字符串，开嵌套展开时会被还原
                5 => json!(format!("{{\"inner_id\":{},\"tag\":\"嵌套\"}}", i)),
                _ => json!(null),
            };
            obj.insert(key, value);
        }

        Value::Object(obj)
    }

    let mut root = serde_json::Map::new();
    root.insert(
        "metadata".to_string(),
        json!({
            "generated_at": "2025-01-09T10:00:00Z",
            "depth": depth,
            "width": width,
            "big_id": 1234567890123456789i64,
            "description": "性能测试用大型JSON文档"
        }),
    );

    root.insert("data".to_string(), create_nested_object(0, depth, width));

    let large_array: Vec<Value> = (0..width * 10)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("项目_{}", i),
                "value": i * 2,
                "active": i % 3 == 0
            })
        })
        .collect();
    root.insert("items".to_string(), json!(large_array));

    Value::Object(root)
}

/// 测试完整解析流水线（去壳、大数标记、解析、可选嵌套展开）
pub fn benchmark_parse_pipeline(raw: &str, expand_nested: bool) -> PerformanceResult {
    let start = Instant::now();
    let parse_result = normalizer::parse(raw, expand_nested);
    let duration = start.elapsed();

    match parse_result {
        Ok(value) => PerformanceResult::new(
            "解析流水线",
            duration.as_millis(),
            true,
            &format!(
                "解析 {} 字节, 产出 {} 个节点, 嵌套展开: {}",
                raw.len(),
                count_nodes(&value),
                expand_nested
            ),
        ),
        Err(e) => PerformanceResult::new(
            "解析流水线",
            duration.as_millis(),
            false,
            &format!("解析失败: {}", e),
        ),
    }
}

/// 测试命中集计算性能
pub fn benchmark_match_computation(root: &Value, options: &SearchOptions) -> PerformanceResult {
    let start = Instant::now();
    let matches = compute_matches(root, options);
    let duration = start.elapsed();

    PerformanceResult::new(
        "命中计算",
        duration.as_millis(),
        true,
        &format!("查询 {} 命中 {} 处", options.query, matches.len()),
    )
}

/// 测试全展开状态下的树投影性能
pub fn benchmark_projection(root: &Value) -> PerformanceResult {
    let mut engine = TreeEngine::new();
    let options = SearchOptions::default();
    engine.apply_global_signal(
        &GlobalExpandSignal {
            mode: SignalMode::ExpandAll,
            tick: 1,
        },
        root,
        &[],
        &options,
        false,
    );

    let start = Instant::now();
    let tree = project_tree(root, &engine, &[], &options, false, None);
    let duration = start.elapsed();

    fn count_rows(node: &RenderNode) -> usize {
        1 + node.children.iter().map(count_rows).sum::<usize>()
    }

    match tree {
        Some(node) => PerformanceResult::new(
            "树投影",
            duration.as_millis(),
            true,
            &format!("投影出 {} 行", count_rows(&node)),
        ),
        None => PerformanceResult::new("树投影", duration.as_millis(), false, "投影为空"),
    }
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    // 测试不同规模的数据
    let test_cases = [
        (3, 10), // 小型：深度3，宽度10
        (4, 20), // 中型：深度4，宽度20
        (5, 30), // 大型：深度5，宽度30
    ];

    for (depth, width) in test_cases {
        println!("测试规模：深度{}，宽度{}", depth, width);

        let start = Instant::now();
        let document = generate_large_document(depth, width);
        let generation_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("数据生成({}x{})", depth, width),
            generation_time.as_millis(),
            true,
            &format!("生成 {} 个节点", count_nodes(&document)),
        ));

        // 序列化出原始文本，后续解析基准吃的就是它
        let start = Instant::now();
        let raw_text = serde_json::to_string(&document).unwrap();
        let serialization_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("JSON序列化({}x{})", depth, width),
            serialization_time.as_millis(),
            true,
            &format!("序列化了 {} 字节", raw_text.len()),
        ));

        results.push(benchmark_parse_pipeline(&raw_text, false));
        results.push(benchmark_parse_pipeline(&raw_text, true));

        let content_options = SearchOptions {
            query: "项目_1".to_string(),
            ..SearchOptions::default()
        };
        results.push(benchmark_match_computation(&document, &content_options));

        results.push(benchmark_projection(&document));
    }

    results
}
