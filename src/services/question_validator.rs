//! 题目校验服务 - 业务能力层
//!
//! 只负责"单个题目是否合格"，不关心批次和提交

use crate::error::ItemFailure;
use crate::models::{Difficulty, Localized, QuestionDraft, QuestionIndex, QuestionType, SchemaKind};
use serde_json::{json, Value};

/// 选择题至少需要的有效选项数
pub const MIN_OPTIONS: usize = 2;

/// 通过校验的题目
#[derive(Debug, Clone, PartialEq)]
pub struct ValidQuestion {
    pub draft: QuestionDraft,
    pub question_type: QuestionType,
}

impl ValidQuestion {
    pub fn kind(&self) -> SchemaKind {
        self.draft.kind()
    }
}

/// 校验单个数组元素
///
/// - 必须是对象，且能判定结构代际
/// - 必须有题干和题型
/// - 选择题的选项只保留两种语言都非空的项，少于 2 个时单独报错
pub fn validate(value: Value) -> Result<ValidQuestion, ItemFailure> {
    let Value::Object(body) = value else {
        return Err(ItemFailure::invalid("元素不是对象"));
    };

    let mut draft = QuestionDraft::detect(body)
        .ok_or_else(|| ItemFailure::invalid("缺少题干和题型字段"))?;

    match draft.question_body() {
        Some(Value::Object(_)) => {}
        Some(_) => return Err(ItemFailure::invalid("题干必须是 {uz, ru} 对象")),
        None => return Err(ItemFailure::invalid("缺少题干")),
    }

    let question_type = match draft.type_indicator() {
        Some(Value::String(s)) => QuestionType::parse(s)
            .ok_or_else(|| ItemFailure::invalid(format!("未知题型: {}", s)))?,
        Some(other) => {
            return Err(ItemFailure::invalid(format!("题型必须是单个字符串: {}", other)))
        }
        None => return Err(ItemFailure::invalid("缺少题型")),
    };

    if question_type == QuestionType::MultipleChoice {
        let kept = filter_options(draft.body().get("options"));
        if kept.len() < MIN_OPTIONS {
            return Err(ItemFailure::InsufficientOptions { found: kept.len() });
        }
        draft.body_mut().insert("options".to_string(), Value::Array(kept));
    }

    Ok(ValidQuestion {
        draft,
        question_type,
    })
}

/// 保留 uz、ru 都非空的选项
fn filter_options(options: Option<&Value>) -> Vec<Value> {
    options
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| {
                    serde_json::from_value::<Localized>((*item).clone())
                        .map(|opt| !opt.is_blank_any())
                        .unwrap_or(false)
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// 单题表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleQuestionForm {
    pub question: Localized,
    pub answer: Localized,
    pub options: Vec<Localized>,
    pub question_type: QuestionType,
    pub level: Difficulty,
    pub index: Option<QuestionIndex>,
    pub topic_id: String,
}

/// 由单题表单构建旧版扁平结构的请求体
///
/// 题干、答案四个字段必填；选择题至少 2 个有效选项，开放题发送空选项。
pub fn build_single_question(form: &SingleQuestionForm) -> Result<Value, ItemFailure> {
    if form.topic_id.trim().is_empty() {
        return Err(ItemFailure::invalid("必须先选择主题"));
    }
    if form.question.is_blank_any() || form.answer.is_blank_any() {
        return Err(ItemFailure::invalid("题干和答案的 uz / ru 都必须填写"));
    }

    let options: Vec<&Localized> = match form.question_type {
        QuestionType::MultipleChoice => {
            let valid: Vec<&Localized> =
                form.options.iter().filter(|o| !o.is_blank_any()).collect();
            if valid.len() < MIN_OPTIONS {
                return Err(ItemFailure::InsufficientOptions { found: valid.len() });
            }
            valid
        }
        QuestionType::Open => Vec::new(),
    };

    Ok(json!({
        "question_text": form.question,
        "answer": [form.answer],
        "options": options,
        "question_type": form.question_type.legacy_code(),
        "question_index": form.index.map(|i| i.to_string()).unwrap_or_default(),
        "question_level": form.level.as_str(),
        "topic_id": form.topic_id,
    }))
}
