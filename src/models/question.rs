use phf::phf_map;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// 选择题
    MultipleChoice,
    /// 开放题
    Open,
}

/// 两代 API 使用的题型写法（旧版 multiple_choice，新版 mcq）
static QUESTION_TYPE_ALIASES: phf::Map<&'static str, QuestionType> = phf_map! {
    "multiple_choice" => QuestionType::MultipleChoice,
    "mcq" => QuestionType::MultipleChoice,
    "open" => QuestionType::Open,
};

impl QuestionType {
    /// 从任意一代的写法解析（大小写、首尾空白不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        QUESTION_TYPE_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
    }

    /// 旧版扁平结构中的写法
    pub fn legacy_code(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Open => "open",
        }
    }

    /// 列表中显示的标签
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Test",
            QuestionType::Open => "Open",
        }
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// 分组（只在新版嵌套结构中使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
    C,
    D,
    E,
}

impl Group {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Group::A),
            "B" => Some(Group::B),
            "C" => Some(Group::C),
            "D" => Some(Group::D),
            "E" => Some(Group::E),
            _ => None,
        }
    }

    /// 从 1 开始的序号，用于拼接题目编号
    pub fn ordinal(self) -> usize {
        self as usize + 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Group::A => "A",
            Group::B => "B",
            Group::C => "C",
            Group::D => "D",
            Group::E => "E",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 题目编号：`班级_章节_主题_分组_序号`，各段均为从 1 开始的序号
///
/// 只负责拼接，不检查是否与已有题目冲突。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionIndex {
    pub class: usize,
    pub chapter: usize,
    pub topic: usize,
    pub group: usize,
    pub count: usize,
}

impl fmt::Display for QuestionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.class, self.chapter, self.topic, self.group, self.count
        )
    }
}

/// 题目数据的结构代际
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// 扁平结构：question_text / question_type / question_level / question_index
    Legacy,
    /// 嵌套结构：question + information{class, chapter, topic, group, count, index, difficulty, type}
    Nested,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::Legacy => f.write_str("legacy"),
            SchemaKind::Nested => f.write_str("nested"),
        }
    }
}

/// 导入的单个题目草稿
///
/// 解析时判定一次结构代际，之后只按标签分支，不再逐字段试探。
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionDraft {
    Legacy(Map<String, Value>),
    Nested(Map<String, Value>),
}

impl QuestionDraft {
    /// 根据字段判定结构代际；无法判定时返回 None
    pub fn detect(body: Map<String, Value>) -> Option<Self> {
        if body.contains_key("information") || body.contains_key("question") {
            Some(QuestionDraft::Nested(body))
        } else if body.contains_key("question_text") || body.contains_key("question_type") {
            Some(QuestionDraft::Legacy(body))
        } else {
            None
        }
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            QuestionDraft::Legacy(_) => SchemaKind::Legacy,
            QuestionDraft::Nested(_) => SchemaKind::Nested,
        }
    }

    pub fn body(&self) -> &Map<String, Value> {
        match self {
            QuestionDraft::Legacy(body) | QuestionDraft::Nested(body) => body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            QuestionDraft::Legacy(body) | QuestionDraft::Nested(body) => body,
        }
    }

    /// 题干（旧版 question_text，新版 question，缺省时也接受 question_text）
    pub fn question_body(&self) -> Option<&Value> {
        let body = self.body();
        match self.kind() {
            SchemaKind::Legacy => body.get("question_text"),
            SchemaKind::Nested => body.get("question").or_else(|| body.get("question_text")),
        }
    }

    /// 题型字段的原始值
    pub fn type_indicator(&self) -> Option<&Value> {
        match self {
            QuestionDraft::Legacy(body) => body.get("question_type"),
            QuestionDraft::Nested(body) => body.get("information").and_then(|info| info.get("type")),
        }
    }

    /// 嵌套结构的 information 对象（不存在时创建）
    pub fn information_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match self {
            QuestionDraft::Legacy(_) => None,
            QuestionDraft::Nested(body) => {
                let info = body
                    .entry("information")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !info.is_object() {
                    *info = Value::Object(Map::new());
                }
                info.as_object_mut()
            }
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            QuestionDraft::Legacy(body) | QuestionDraft::Nested(body) => Value::Object(body),
        }
    }
}

/// 列表接口返回的题目（只取显示需要的字段，两代结构都接受）
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionSummary {
    #[serde(default)]
    pub id: Value,
    #[serde(default, alias = "question")]
    pub question_text: Option<crate::models::Localized>,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub question_level: Option<String>,
    #[serde(default)]
    pub question_index: Option<String>,
    #[serde(default)]
    pub information: Option<Value>,
    #[serde(default)]
    pub options: Vec<crate::models::Localized>,
    #[serde(default)]
    pub answer: Vec<crate::models::Localized>,
}

impl QuestionSummary {
    /// 列表行的 key
    pub fn key(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn question_type(&self) -> Option<QuestionType> {
        self.question_type
            .as_deref()
            .or_else(|| {
                self.information
                    .as_ref()
                    .and_then(|i| i.get("type"))
                    .and_then(Value::as_str)
            })
            .and_then(QuestionType::parse)
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.question_level
            .as_deref()
            .or_else(|| {
                self.information
                    .as_ref()
                    .and_then(|i| i.get("difficulty"))
                    .and_then(Value::as_str)
            })
            .and_then(Difficulty::parse)
    }

    pub fn index(&self) -> Option<String> {
        self.question_index.clone().or_else(|| {
            self.information
                .as_ref()
                .and_then(|i| i.get("index"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }
}
