//! 导入上下文
//!
//! 封装"这一批题目要挂到哪个班级 / 章节 / 主题 / 分组下"这一信息

use crate::error::ConfigError;
use crate::models::{Group, QuestionIndex};
use crate::workflow::selection::SelectionCascade;
use std::fmt::Display;

/// 一次导入任务的上下文
#[derive(Debug, Clone)]
pub struct ImportCtx {
    /// 任务索引（仅用于日志显示）
    pub job_index: usize,

    pub job_name: String,

    pub topic_id: String,

    pub class_name: String,
    pub chapter_name: String,
    pub topic_name: String,

    pub group: Option<Group>,

    /// 本批第一道题的序号
    pub start_count: usize,

    /// (班级, 章节, 主题) 的序号，用于拼接题目编号
    pub ordinals: (usize, usize, usize),
}

impl ImportCtx {
    /// 从已完成选择的级联状态构建；至少要选到主题
    pub fn from_cascade(
        cascade: &SelectionCascade,
        job_index: usize,
        job_name: impl Into<String>,
        start_count: usize,
    ) -> Result<Self, ConfigError> {
        if cascade.topic_id().trim().is_empty() {
            return Err(ConfigError::MissingSelection { field: "topic" });
        }

        Ok(Self {
            job_index,
            job_name: job_name.into(),
            topic_id: cascade.topic_id().to_string(),
            class_name: cascade.class_name(),
            chapter_name: cascade.chapter_name(),
            topic_name: cascade.topic_name(),
            group: cascade.group(),
            start_count,
            ordinals: cascade.ordinals(),
        })
    }

    /// 数组中第 `position` 个元素（从 0 开始）的序号
    pub fn count_for(&self, position: usize) -> usize {
        self.start_count + position
    }

    /// 数组中第 `position` 个元素的题目编号，未选分组时分组段为 1
    pub fn index_for(&self, position: usize) -> QuestionIndex {
        let (class, chapter, topic) = self.ordinals;
        QuestionIndex {
            class,
            chapter,
            topic,
            group: self.group.map_or(1, Group::ordinal),
            count: self.count_for(position),
        }
    }
}

impl Display for ImportCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {} {} | {} / {} / {}",
            self.job_index, self.job_name, self.class_name, self.chapter_name, self.topic_name
        )?;
        if let Some(group) = self.group {
            write!(f, " / {}", group)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(group: Option<Group>) -> ImportCtx {
        ImportCtx {
            job_index: 1,
            job_name: "kasrlar.toml".to_string(),
            topic_id: "T1".to_string(),
            class_name: "5-sinf".to_string(),
            chapter_name: "Sonlar".to_string(),
            topic_name: "Kasrlar".to_string(),
            group,
            start_count: 4,
            ordinals: (5, 2, 3),
        }
    }

    #[test]
    fn index_uses_ordinals_group_and_running_count() {
        assert_eq!(ctx(Some(Group::B)).index_for(0).to_string(), "5_2_3_2_4");
        assert_eq!(ctx(None).index_for(2).to_string(), "5_2_3_1_6");
    }

    #[test]
    fn display_includes_group_when_selected() {
        assert_eq!(
            ctx(Some(Group::E)).to_string(),
            "[任务 1 kasrlar.toml | 5-sinf / Sonlar / Kasrlar / E]"
        );
        assert!(!ctx(None).to_string().contains(" / E"));
    }

    #[test]
    fn requires_topic() {
        let cascade = SelectionCascade::new();
        assert_eq!(
            ImportCtx::from_cascade(&cascade, 1, "x", 1).unwrap_err(),
            ConfigError::MissingSelection { field: "topic" }
        );
    }
}
