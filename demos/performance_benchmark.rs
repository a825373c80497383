//! 性能基准测试入口
//!
//! 运行方式: cargo run --release --example performance_benchmark

use tracing_subscriber::fmt::SubscriberBuilder;

use json_r_geshihua::model::performance::run_performance_suite;

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    println!("=== JSON格式化核心性能基准测试 ===\n");

    let results = run_performance_suite();

    println!("\n{:<24} {:>10} {:>6}  详情", "操作", "耗时(ms)", "状态");
    println!("{}", "-".repeat(72));
    for result in &results {
        let status = if result.success { "成功" } else { "失败" };
        println!(
            "{:<24} {:>10} {:>6}  {}",
            result.operation, result.duration_ms, status, result.details
        );
    }

    let slow: Vec<_> = results.iter().filter(|r| r.duration_ms > 500).collect();
    if !slow.is_empty() {
        println!("\n超过500ms的操作:");
        for result in slow {
            println!("  {} ({}ms)", result.operation, result.duration_ms);
        }
    }

    if results.iter().any(|r| !r.success) {
        anyhow::bail!("部分基准测试未通过");
    }

    println!("\n全部基准测试完成");
    Ok(())
}
