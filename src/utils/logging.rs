//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use tracing::info;

use crate::config::Config;
use crate::models::AnalysisResult;
use crate::workflow::PassSummary;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 程序配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🧠 分析模型: {}", config.analysis_model);
    info!("🎨 插图模型: {}", config.illustration_model);
    info!("📁 输出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录分析完成信息
pub fn log_analysis_ready(analysis: &AnalysisResult) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 分析完成: {} / {}", analysis.subject, truncate_text(&analysis.topic, 40));
    info!("📋 共 {} 道题目", analysis.questions.len());
    info!("🌐 检索来源 {} 个", analysis.sources.len());
    info!("{}", "─".repeat(60));
}

/// 记录插图生成统计
pub fn log_pass_complete(summary: &PassSummary) {
    if summary.discarded {
        info!(
            "⏹ 插图生成已停止（练习册已关闭）: 成功 {}, 失败 {}",
            summary.succeeded, summary.failed
        );
    } else {
        info!(
            "✅ 插图生成完成: 成功 {}, 失败 {}",
            summary.succeeded, summary.failed
        );
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
