//! 单个导入任务处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单个导入任务（一个 TOML 文件），是任务级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **解析选择**：按任务里的 id 走一遍 班级 → 章节 → 主题 → 分组 级联
//! 2. **批量导入**：委托 `run_import` 逐题提交
//! 3. **失败记录**：每道失败的题目写入失败文件
//! 4. **文件清理**：全部成功时删除任务文件
//! 5. **统计输出**：记录成功/失败数量

use crate::clients::{HierarchySource, QuestionGateway};
use crate::config::Config;
use crate::error::ConfigError;
use crate::models::{Group, ImportJob};
use crate::orchestrator::import_pipeline::{run_import, ImportReport};
use crate::services::FailureWriter;
use crate::workflow::{CascadeLoader, ImportCtx, SelectionCascade};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// 单个任务的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// 已逐题提交（可能有部分失败）
    Completed(ImportReport),
    /// 文档级错误，一道题也没有提交
    Aborted(String),
}

/// 处理单个导入任务
///
/// # 参数
/// - `client`: 题库接口（层级查询 + 提交）
/// - `job`: 导入任务
/// - `job_index`: 任务索引（用于日志）
/// - `config`: 配置
/// - `failure_writer`: 失败记录
pub async fn process_job<C>(
    client: &C,
    job: ImportJob,
    job_index: usize,
    config: &Config,
    failure_writer: &FailureWriter,
) -> Result<JobOutcome>
where
    C: QuestionGateway + HierarchySource,
{
    let job_name = job.display_name();
    log_job_start(job_index, &job_name, &job);

    let cascade = match resolve_selection(client, &job).await {
        Ok(cascade) => cascade,
        Err(e) => return abort(job_index, &job_name, e.to_string(), failure_writer),
    };

    let ctx = ImportCtx::from_cascade(&cascade, job_index, job_name.clone(), job.count)?;
    info!("{} 选择完成", ctx);

    let report = match run_import(client, &ctx, &job.code, config.verbose_logging).await {
        Ok(report) => report,
        Err(e) => return abort(job_index, &job_name, e.to_string(), failure_writer),
    };

    // 题目已经提交，之后的文件操作出错只记日志，不影响统计
    for (index, failure) in &report.failures {
        if let Err(e) = failure_writer.write(&job_name, *index, &failure.to_string()) {
            error!("[任务 {}] ❌ 写入失败记录出错: {:#}", job_index, e);
        }
    }

    if report.all_succeeded() && config.delete_completed_jobs {
        if let Err(e) = cleanup_file(job.file_path.as_deref(), job_index) {
            error!("[任务 {}] ❌ 清理任务文件出错: {:#}", job_index, e);
        }
    } else if !report.all_succeeded() {
        info!(
            "[任务 {}] 📝 失败题目已写入 {}，保留任务文件",
            job_index,
            failure_writer.path()
        );
    }

    log_job_complete(job_index, &report);

    Ok(JobOutcome::Completed(report))
}

/// 按任务中的 id 驱动级联选择
///
/// 列表请求失败不会中止任务，名称退回原始 id。
pub async fn resolve_selection<S: HierarchySource>(
    source: &S,
    job: &ImportJob,
) -> Result<SelectionCascade, ConfigError> {
    for (field, value) in [
        ("class", &job.class_id),
        ("chapter", &job.chapter_id),
        ("topic", &job.topic_id),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingSelection { field });
        }
    }

    let group = match job.group.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        Some(raw) => Some(Group::parse(raw).ok_or_else(|| ConfigError::InvalidGroup {
            value: raw.to_string(),
        })?),
        None => None,
    };

    let loader = CascadeLoader::new(source);
    let mut cascade = SelectionCascade::new();

    loader.load_classes(&mut cascade).await;
    loader.choose_class(&mut cascade, job.class_id.trim()).await;
    loader
        .choose_chapter(&mut cascade, job.chapter_id.trim())
        .await?;
    cascade.select_topic(job.topic_id.trim())?;
    if let Some(group) = group {
        cascade.select_group(group)?;
    }

    Ok(cascade)
}

fn abort(
    job_index: usize,
    job_name: &str,
    reason: String,
    failure_writer: &FailureWriter,
) -> Result<JobOutcome> {
    error!("[任务 {}] ❌ 整批中止: {}", job_index, reason);
    failure_writer
        .write(job_name, 0, &reason)
        .with_context(|| format!("[任务 {}] 写入失败记录出错", job_index))?;
    Ok(JobOutcome::Aborted(reason))
}

/// 清理已处理的文件
fn cleanup_file(file_path: Option<&str>, job_index: usize) -> Result<()> {
    info!("[任务 {}] 🗑️ 清理已处理的文件...", job_index);

    let Some(file_path) = file_path else {
        warn!("[任务 {}] ⚠️ 文件路径未设置", job_index);
        return Ok(());
    };

    let path = Path::new(file_path);
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("无法删除文件: {}", file_path))?;
        info!(
            "[任务 {}] ✓ 文件已删除: {}",
            job_index,
            path.file_name().unwrap_or_default().to_string_lossy()
        );
    } else {
        warn!("[任务 {}] ⚠️ 文件不存在: {}", job_index, file_path);
    }

    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_job_start(job_index: usize, name: &str, job: &ImportJob) {
    info!("\n[任务 {}] {}", job_index, "─".repeat(30));
    info!("[任务 {}] 开始处理: {}", job_index, name);
    info!(
        "[任务 {}] 班级 {} / 章节 {} / 主题 {} / 分组 {}",
        job_index,
        job.class_id,
        job.chapter_id,
        job.topic_id,
        job.group.as_deref().unwrap_or("-")
    );
}

fn log_job_complete(job_index: usize, report: &ImportReport) {
    info!(
        "[任务 {}] 题目统计: 成功 {}, 失败 {}, 总计 {}",
        job_index,
        report.succeeded,
        report.failed(),
        report.total
    );
    info!("[任务 {}] ✅ 任务处理完成\n", job_index);
}
