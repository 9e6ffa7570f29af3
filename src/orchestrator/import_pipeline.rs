//! 批量导入管线 - 编排层
//!
//! 解析 → 修复 → 校验 → 逐题提交，单题失败不影响其他题目。
//!
//! 文档级错误（空内容、无法解析、不是数组、未选主题）整批中止，一个请求都不发。

use crate::clients::QuestionGateway;
use crate::error::{ImportError, ItemFailure};
use crate::services::{lenient_parse, validate};
use crate::workflow::{ImportCtx, ImportFlow};
use serde_json::Value;
use tracing::{info, warn};

/// 一批题目的导入结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub total: usize,
    pub succeeded: usize,
    /// (数组中的序号，从 1 开始, 失败原因)
    pub failures: Vec<(usize, ItemFailure)>,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && self.succeeded == self.total
    }

    /// 失败序号列表，如 `#2, #5`
    pub fn failed_indices(&self) -> String {
        self.failures
            .iter()
            .map(|(index, _)| format!("#{}", index))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 导入一批粘贴内容
///
/// 请求按数组顺序逐个发出，前一个完成后才发下一个。
pub async fn run_import<G: QuestionGateway>(
    gateway: &G,
    ctx: &ImportCtx,
    code: &str,
    verbose_logging: bool,
) -> Result<ImportReport, ImportError> {
    if ctx.topic_id.trim().is_empty() {
        return Err(ImportError::MissingTopic);
    }

    let Value::Array(items) = lenient_parse(code)? else {
        return Err(ImportError::NotAnArray);
    };

    let mut report = ImportReport {
        total: items.len(),
        ..Default::default()
    };
    info!("[任务 {}] 共 {} 道题目待提交", ctx.job_index, report.total);

    let flow = ImportFlow::new(gateway, verbose_logging);

    for (position, item) in items.into_iter().enumerate() {
        let index = position + 1;

        let outcome = match validate(item) {
            Ok(question) => flow.run(ctx, position, question).await.map(|_| ()),
            Err(failure) => Err(failure),
        };

        match outcome {
            Ok(()) => report.succeeded += 1,
            Err(failure) => {
                warn!("[任务 {}] ❌ 题目 {}: {}", ctx.job_index, index, failure);
                report.failures.push((index, failure));
            }
        }
    }

    if report.failures.is_empty() {
        info!(
            "[任务 {}] ✅ 全部 {} 道题目导入成功",
            ctx.job_index, report.succeeded
        );
    } else {
        warn!(
            "[任务 {}] ⚠️ 成功 {} 道，失败 {} 道: {}",
            ctx.job_index,
            report.succeeded,
            report.failed(),
            report.failed_indices()
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_helpers() {
        let report = ImportReport {
            total: 3,
            succeeded: 1,
            failures: vec![
                (2, ItemFailure::InsufficientOptions { found: 1 }),
                (3, ItemFailure::invalid("x")),
            ],
        };
        assert_eq!(report.failed(), 2);
        assert!(!report.all_succeeded());
        assert_eq!(report.failed_indices(), "#2, #3");

        let empty = ImportReport::default();
        assert!(empty.all_succeeded());
    }
}
