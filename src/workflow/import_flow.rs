//! 题目导入流程 - 流程层
//!
//! 核心职责：定义"一道已通过校验的题"从补全到提交的流程
//!
//! 流程顺序：
//! 1. 写入 topic_id
//! 2. 按结构代际补全层级信息和编号
//! 3. 提交，服务器拒绝时转为单题失败

use serde_json::{json, Map, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::clients::QuestionGateway;
use crate::error::ItemFailure;
use crate::models::{Localized, QuestionDraft, SchemaKind};
use crate::services::ValidQuestion;
use crate::utils::logging::truncate_text;
use crate::workflow::import_ctx::ImportCtx;

/// 题目导入流程
///
/// - 不持有批次状态，每道题独立
/// - 只依赖提交能力（QuestionGateway）
pub struct ImportFlow<'a, G: QuestionGateway> {
    gateway: &'a G,
    verbose_logging: bool,
}

impl<'a, G: QuestionGateway> ImportFlow<'a, G> {
    pub fn new(gateway: &'a G, verbose_logging: bool) -> Self {
        Self {
            gateway,
            verbose_logging,
        }
    }

    /// 补全并提交数组中第 `position` 个元素（从 0 开始）
    pub async fn run(
        &self,
        ctx: &ImportCtx,
        position: usize,
        question: ValidQuestion,
    ) -> Result<JsonValue, ItemFailure> {
        let item_no = position + 1;
        self.log_stem(ctx, item_no, &question.draft);

        let body = enrich(question.draft, ctx, position)?;
        if self.verbose_logging {
            debug!("[任务 {}] 题目 {} 请求体: {}", ctx.job_index, item_no, body);
        }

        match self.gateway.create_question(&body).await {
            Ok(response) => {
                info!("[任务 {}] ✓ 题目 {} 提交成功", ctx.job_index, item_no);
                Ok(response)
            }
            Err(e) => {
                warn!("[任务 {}] ⚠️ 题目 {} 提交失败: {}", ctx.job_index, item_no, e);
                Err(ItemFailure::Rejected {
                    message: e.summary(),
                })
            }
        }
    }

    fn log_stem(&self, ctx: &ImportCtx, item_no: usize, draft: &QuestionDraft) {
        let stem = draft
            .question_body()
            .cloned()
            .and_then(|v| serde_json::from_value::<Localized>(v).ok())
            .map(|l| l.display().to_string())
            .unwrap_or_default();
        info!(
            "[任务 {}] 题目 {}: {}",
            ctx.job_index,
            item_no,
            truncate_text(&stem, 80)
        );
    }
}

/// 用上下文补全题目：
/// - 始终写入 topic_id
/// - 旧版结构缺编号时补 question_index
/// - 嵌套结构用当前选择覆盖 information 的层级名称，缺 count / index 时补全
pub fn enrich(
    mut draft: QuestionDraft,
    ctx: &ImportCtx,
    position: usize,
) -> Result<JsonValue, ItemFailure> {
    match draft.kind() {
        SchemaKind::Legacy => {
            let body = draft.body_mut();
            if is_blank(body.get("question_index")) {
                let index = ctx.index_for(position).to_string();
                body.insert("question_index".to_string(), json!(index));
            }
        }
        SchemaKind::Nested => {
            let group = ctx
                .group
                .ok_or_else(|| ItemFailure::invalid("嵌套结构的题目必须先选择分组"))?;
            if let Some(info) = draft.information_mut() {
                fill_information(info, ctx, group.as_str(), position);
            }
        }
    }

    draft
        .body_mut()
        .insert("topic_id".to_string(), json!(ctx.topic_id));
    Ok(draft.into_value())
}

fn fill_information(
    info: &mut Map<String, JsonValue>,
    ctx: &ImportCtx,
    group: &str,
    position: usize,
) {
    info.insert("class".to_string(), json!(ctx.class_name));
    info.insert("chapter".to_string(), json!(ctx.chapter_name));
    info.insert("topic".to_string(), json!(ctx.topic_name));
    info.insert("group".to_string(), json!(group));

    // 题目自带的 count 优先，编号末段与之保持一致
    let mut index = ctx.index_for(position);
    match info.get("count").and_then(JsonValue::as_u64) {
        Some(count) => index.count = count as usize,
        None => {
            info.insert("count".to_string(), json!(index.count));
        }
    }
    if is_blank(info.get("index")) {
        info.insert("index".to_string(), json!(index.to_string()));
    }
}

fn is_blank(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;
    use crate::services::validate;

    fn ctx(group: Option<Group>) -> ImportCtx {
        ImportCtx {
            job_index: 1,
            job_name: "job".to_string(),
            topic_id: "T1".to_string(),
            class_name: "5-sinf".to_string(),
            chapter_name: "Sonlar".to_string(),
            topic_name: "Kasrlar".to_string(),
            group,
            start_count: 1,
            ordinals: (1, 2, 3),
        }
    }

    #[test]
    fn legacy_items_get_topic_and_missing_index() {
        let valid = validate(json!({
            "question_text": { "uz": "a", "ru": "b" },
            "question_type": "open",
            "question_index": ""
        }))
        .unwrap();
        let body = enrich(valid.draft, &ctx(None), 1).unwrap();
        assert_eq!(body["topic_id"], "T1");
        assert_eq!(body["question_index"], "1_2_3_1_2");

        let valid = validate(json!({
            "question_text": { "uz": "a", "ru": "b" },
            "question_type": "open",
            "question_index": "9_9_9_9_9",
            "topic_id": "stale"
        }))
        .unwrap();
        let body = enrich(valid.draft, &ctx(None), 0).unwrap();
        assert_eq!(body["question_index"], "9_9_9_9_9");
        assert_eq!(body["topic_id"], "T1");
    }

    #[test]
    fn nested_items_take_names_from_selection() {
        let valid = validate(json!({
            "question": { "uz": "a", "ru": "b" },
            "information": {
                "type": "open",
                "class": "old",
                "group": "A",
                "count": 7
            }
        }))
        .unwrap();
        let body = enrich(valid.draft, &ctx(Some(Group::D)), 0).unwrap();
        let info = &body["information"];
        assert_eq!(info["class"], "5-sinf");
        assert_eq!(info["chapter"], "Sonlar");
        assert_eq!(info["topic"], "Kasrlar");
        assert_eq!(info["group"], "D");
        assert_eq!(info["count"], 7);
        assert_eq!(info["index"], "1_2_3_4_7");
        assert_eq!(body["topic_id"], "T1");
    }

    #[test]
    fn nested_items_require_group() {
        let valid = validate(json!({
            "question": { "uz": "a", "ru": "b" },
            "information": { "type": "open" }
        }))
        .unwrap();
        assert!(matches!(
            enrich(valid.draft, &ctx(None), 0),
            Err(ItemFailure::Invalid { .. })
        ));
    }
}
