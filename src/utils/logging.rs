/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing，默认 info 级别，可用 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,question_bank_admin=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题库导入日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(api_base_url: &str, import_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题库批量导入模式");
    info!("🌐 接口地址: {}", api_base_url);
    info!("📁 任务目录: {}", import_folder);
    info!("{}", "=".repeat(60));
}

/// 记录任务加载信息
pub fn log_jobs_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的导入任务", total);
    info!("💡 任务按文件名顺序逐个处理，题目逐条提交\n");
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 各项计数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(stats: &ImportStats, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "📄 任务: 完成 {}/{}，中止 {}",
        stats.jobs_completed, stats.jobs_total, stats.jobs_aborted
    );
    info!("✅ 题目成功: {}", stats.items_succeeded);
    info!("❌ 题目失败: {}", stats.items_failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 全局处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub jobs_total: usize,
    pub jobs_completed: usize,
    pub jobs_aborted: usize,
    pub items_succeeded: usize,
    pub items_failed: usize,
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_chars_not_bytes() {
        assert_eq!(truncate_text("Привет, dunyo", 6), "Привет...");
        assert_eq!(truncate_text("qisqa", 10), "qisqa");
    }
}
