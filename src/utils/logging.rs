//! 日志工具模块
//!
//! 提供日志初始化以及批处理过程中的格式化输出

use std::path::Path;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者
///
/// 设置了 `RUST_LOG` 时以它为准，否则默认 info（verbose 时为 debug）。
/// 重复调用是安全的（测试中可能多次初始化）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("medcode_agent={default_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `mode`: 运行模式（agent / baseline）
/// - `exam_path`: 题目文件路径
/// - `model`: 使用的推理模型
pub fn log_startup(mode: &str, exam_path: &Path, model: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {} 模式", mode);
    info!("🕐 启动时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("📄 题目文件: {}", exam_path.display());
    info!("🤖 推理模型: {}", model);
    info!("{}", "=".repeat(60));
}

/// 记录题目加载信息
pub fn log_questions_loaded(total: usize, batch_size: usize) {
    info!("✓ 找到 {} 道题目", total);
    info!("📋 每 {} 道为一组写入结果日志\n", batch_size);
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `start`: 起始题目序号
/// - `end`: 结束题目序号
/// - `total`: 题目总数
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 组", batch_num, total_batches);
    info!("📄 本组题目: {}-{} / 共 {} 道", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 组完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `elapsed`: 总耗时
/// - `result_path`: 结果日志路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, elapsed: Duration, result_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("⏱️ 总耗时: {:.1}s", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", result_path.display());
}

/// 截断长文本用于日志显示（按字符计数，换行替换为空格）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_len {
        flat.chars().take(max_len).collect::<String>() + "..."
    } else {
        flat
    }
}
