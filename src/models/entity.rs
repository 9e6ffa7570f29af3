use serde::{Deserialize, Serialize};

/// 双语文本（乌兹别克语 / 俄语）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    #[serde(default)]
    pub uz: String,
    #[serde(default)]
    pub ru: String,
}

impl Localized {
    pub fn new(uz: impl Into<String>, ru: impl Into<String>) -> Self {
        Self {
            uz: uz.into(),
            ru: ru.into(),
        }
    }

    /// 任意一侧去掉空白后为空
    pub fn is_blank_any(&self) -> bool {
        self.uz.trim().is_empty() || self.ru.trim().is_empty()
    }

    /// 显示名称：优先 uz，其次 ru
    pub fn display(&self) -> &str {
        if self.uz.trim().is_empty() {
            &self.ru
        } else {
            &self.uz
        }
    }
}

/// 层级实体的公共能力（级联选择只依赖这一点）
pub trait Named {
    fn id(&self) -> &str;
    fn display_name(&self) -> String;
}

/// 班级（层级顶端）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: Localized,
}

/// 章节，隶属于唯一一个班级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: Localized,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub class_id: Option<String>,
}

/// 主题名称：部分 API 返回纯字符串，部分返回双语对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicName {
    Plain(String),
    Localized(Localized),
}

impl TopicName {
    pub fn display(&self) -> &str {
        match self {
            TopicName::Plain(s) => s,
            TopicName::Localized(l) => l.display(),
        }
    }
}

/// 主题，隶属于唯一一个章节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: TopicName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TopicName>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub chapter_id: Option<String>,
}

/// 新建主题的请求体
#[derive(Debug, Clone, Serialize)]
pub struct NewTopic {
    pub class_id: String,
    pub chapter_id: String,
    pub name: Localized,
    pub title: Localized,
}

/// 新建 / 更新班级或章节的请求体
#[derive(Debug, Clone, Serialize)]
pub struct NamePayload {
    pub name: Localized,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
}

impl Named for Class {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.display().to_string()
    }
}

impl Named for Chapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.display().to_string()
    }
}

impl Named for Topic {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.display().to_string()
    }
}

// ID 在不同接口里可能是字符串也可能是整数，统一成字符串
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn topic_name_accepts_both_shapes() {
        let plain: Topic = serde_json::from_value(json!({
            "id": 7, "name": "Kasrlar", "chapter_id": 3
        }))
        .unwrap();
        assert_eq!(plain.id, "7");
        assert_eq!(plain.display_name(), "Kasrlar");
        assert_eq!(plain.chapter_id.as_deref(), Some("3"));

        let localized: Topic = serde_json::from_value(json!({
            "id": "t-1", "name": { "uz": "", "ru": "Дроби" }
        }))
        .unwrap();
        assert_eq!(localized.display_name(), "Дроби");
        assert_eq!(localized.chapter_id, None);
    }

    #[test]
    fn localized_blank_detection() {
        assert!(Localized::new("a", "  ").is_blank_any());
        assert!(!Localized::new("a", "b").is_blank_any());
    }
}
