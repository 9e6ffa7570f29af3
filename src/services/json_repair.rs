//! 宽松 JSON 解析 - 业务能力层
//!
//! 先严格解析；失败后按固定顺序做文本修复，再解析一次，不再重试。
//!
//! 修复是启发式的，既可能修不全也可能修过头：
//! - 单引号替换会破坏含撇号的文本（如 `o'zbek`）
//! - 裸键加引号会把字符串值里 `, word:` 形式的片段也当成键
//!
//! 这些情况最终都会表现为第二次解析失败，整批中止。

use crate::error::ImportError;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

/// 紧跟 `{`、`,` 或行首、后接冒号的裸标识符
const BARE_KEY_PATTERN: &str = r"(?m)(^|[{,])(\s*)([A-Za-z0-9_]+)(\s*):";
/// JSON 字符串字面量
const STRING_PATTERN: &str = r#""(?:[^"\\]|\\.)*""#;
/// `"A" || "B" (|| "C" ...)`
const LOGICAL_OR_PATTERN: &str = r#""(?:[^"\\]|\\.)*"(?:\s*\|\|\s*"(?:[^"\\]|\\.)*")+"#;

/// 文本修复规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairRule {
    /// 单引号 → 双引号
    SingleQuotes,
    /// 给裸键加双引号
    BareKeys,
    /// 把模板里的 `"A" || "B"` 写法改成数组 `["A","B"]`
    LogicalOrStrings,
}

/// 修复规则的执行顺序
pub const REPAIR_RULES: [RepairRule; 3] = [
    RepairRule::SingleQuotes,
    RepairRule::BareKeys,
    RepairRule::LogicalOrStrings,
];

impl RepairRule {
    pub fn apply(self, text: &str) -> String {
        match self {
            RepairRule::SingleQuotes => text.replace('\'', "\""),
            RepairRule::BareKeys => match Regex::new(BARE_KEY_PATTERN) {
                Ok(re) => re.replace_all(text, "${1}${2}\"${3}\"${4}:").into_owned(),
                Err(_) => text.to_string(),
            },
            RepairRule::LogicalOrStrings => {
                let (Ok(or_re), Ok(string_re)) =
                    (Regex::new(LOGICAL_OR_PATTERN), Regex::new(STRING_PATTERN))
                else {
                    return text.to_string();
                };
                or_re
                    .replace_all(text, |caps: &Captures| {
                        let items: Vec<&str> = string_re
                            .find_iter(&caps[0])
                            .map(|m| m.as_str())
                            .collect();
                        format!("[{}]", items.join(","))
                    })
                    .into_owned()
            }
        }
    }
}

/// 依次应用全部修复规则
pub fn repair(text: &str) -> String {
    REPAIR_RULES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// 严格解析 → 修复 → 再解析一次
pub fn lenient_parse(text: &str) -> Result<Value, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptyBuffer);
    }

    match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(e) => debug!("严格解析失败，尝试修复: {}", e),
    }

    let repaired = repair(text);
    debug!("修复后的内容: {}", repaired);

    serde_json::from_str(&repaired).map_err(|e| ImportError::ParseFailed(e.to_string()))
}
