//! 失败记录服务 - 业务能力层
//!
//! 只负责"把导入失败的题目写进失败文件"，不关心流程

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 失败记录服务
///
/// 职责：
/// - 每个失败题目追加一行：`时间 | 任务 | #序号 | 原因`
/// - 只处理单个题目的记录
/// - 不关心批次顺序
pub struct FailureWriter {
    failure_file_path: String,
}

impl FailureWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            failure_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.failure_file_path
    }

    /// 写入失败记录
    ///
    /// # 参数
    /// - `job_name`: 导入任务名称
    /// - `item_index`: 题目在数组中的序号（从1开始）
    /// - `reason`: 失败原因
    pub fn write(&self, job_name: &str, item_index: usize, reason: &str) -> Result<()> {
        debug!(
            "写入失败记录: 任务 {} | 题目 {} | 原因: {}",
            job_name, item_index, reason
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.failure_file_path)
            .with_context(|| format!("无法打开失败记录文件: {}", self.failure_file_path))?;

        let line = format!(
            "{} | {} | #{} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            job_name,
            item_index,
            reason
        );

        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

impl Default for FailureWriter {
    fn default() -> Self {
        Self::with_path("failed_questions.txt")
    }
}
