//! 级联选择 - 流程层
//!
//! 班级 → 章节 → 主题 → 分组 四级依赖选择：
//! - 选择第 N 级会清空 N+1 级及以下
//! - 上级为空时不发下级请求
//! - 下级列表请求失败或为空时进入不可选的占位状态，不自动重试
//! - 每次请求带代数，已被新选择取代的响应直接丢弃

use crate::clients::HierarchySource;
use crate::error::{AppResult, ConfigError};
use crate::models::{Chapter, Class, Group, Named, Topic};
use std::fmt::Display;
use tracing::{debug, warn};

/// 一级下拉框的可选项状态
#[derive(Debug, Clone, PartialEq)]
pub enum Options<T> {
    /// 上级未选择，未发请求
    Idle,
    Loading,
    Loaded(Vec<T>),
    /// 请求成功但为空
    NotFound,
    /// 请求失败
    Failed(String),
}

impl<T> Options<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Options::Loaded(items) => items,
            _ => &[],
        }
    }

    /// 下拉框是否禁用
    pub fn is_disabled(&self) -> bool {
        !matches!(self, Options::Loaded(_))
    }

    fn from_result<E: Display>(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(items) if items.is_empty() => Options::NotFound,
            Ok(items) => Options::Loaded(items),
            Err(e) => Options::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    NoneSelected,
    ClassSelected,
    ChapterSelected,
    TopicSelected,
    GroupSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeLevel {
    Chapters,
    Topics,
}

/// 下级列表请求凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub level: CascadeLevel,
    pub parent_id: String,
    generation: u64,
}

#[derive(Debug)]
pub struct SelectionCascade {
    classes: Options<Class>,
    chapters: Options<Chapter>,
    topics: Options<Topic>,
    class_id: String,
    chapter_id: String,
    topic_id: String,
    group: Option<Group>,
    chapters_generation: u64,
    topics_generation: u64,
}

impl Default for SelectionCascade {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionCascade {
    pub fn new() -> Self {
        Self {
            classes: Options::Idle,
            chapters: Options::Idle,
            topics: Options::Idle,
            class_id: String::new(),
            chapter_id: String::new(),
            topic_id: String::new(),
            group: None,
            chapters_generation: 0,
            topics_generation: 0,
        }
    }

    pub fn state(&self) -> CascadeState {
        if self.class_id.is_empty() {
            CascadeState::NoneSelected
        } else if self.chapter_id.is_empty() {
            CascadeState::ClassSelected
        } else if self.topic_id.is_empty() {
            CascadeState::ChapterSelected
        } else if self.group.is_none() {
            CascadeState::TopicSelected
        } else {
            CascadeState::GroupSelected
        }
    }

    /// 是否满足提交前提：主题必选，嵌套结构还需要分组
    pub fn is_ready(&self, require_group: bool) -> bool {
        !self.topic_id.is_empty() && (!require_group || self.group.is_some())
    }

    // ========== 选择 ==========

    pub fn select_class(&mut self, id: &str) {
        if self.class_id == id {
            return;
        }
        self.class_id = id.to_string();
        self.chapters = Options::Idle;
        self.chapters_generation += 1;
        self.reset_below_chapter();
    }

    pub fn select_chapter(&mut self, id: &str) -> Result<(), ConfigError> {
        if self.class_id.is_empty() {
            return Err(ConfigError::MissingSelection { field: "class" });
        }
        if self.chapter_id == id {
            return Ok(());
        }
        self.chapter_id = id.to_string();
        self.topics = Options::Idle;
        self.topics_generation += 1;
        self.reset_below_topic();
        Ok(())
    }

    pub fn select_topic(&mut self, id: &str) -> Result<(), ConfigError> {
        if self.chapter_id.is_empty() {
            return Err(ConfigError::MissingSelection { field: "chapter" });
        }
        if self.topic_id != id {
            self.topic_id = id.to_string();
            self.group = None;
        }
        Ok(())
    }

    pub fn select_group(&mut self, group: Group) -> Result<(), ConfigError> {
        if self.topic_id.is_empty() {
            return Err(ConfigError::MissingSelection { field: "topic" });
        }
        self.group = Some(group);
        Ok(())
    }

    fn reset_below_chapter(&mut self) {
        self.chapter_id.clear();
        self.topics = Options::Idle;
        self.topics_generation += 1;
        self.reset_below_topic();
    }

    fn reset_below_topic(&mut self) {
        self.topic_id.clear();
        self.group = None;
    }

    // ========== 列表请求 ==========

    pub fn begin_classes(&mut self) {
        self.classes = Options::Loading;
    }

    pub fn apply_classes<E: Display>(&mut self, result: Result<Vec<Class>, E>) {
        self.classes = Options::from_result(result);
    }

    /// 班级为空时不发章节请求
    pub fn chapters_request(&mut self) -> Option<FetchTicket> {
        if self.class_id.is_empty() {
            return None;
        }
        self.chapters = Options::Loading;
        Some(FetchTicket {
            level: CascadeLevel::Chapters,
            parent_id: self.class_id.clone(),
            generation: self.chapters_generation,
        })
    }

    /// 章节为空时不发主题请求
    pub fn topics_request(&mut self) -> Option<FetchTicket> {
        if self.chapter_id.is_empty() {
            return None;
        }
        self.topics = Options::Loading;
        Some(FetchTicket {
            level: CascadeLevel::Topics,
            parent_id: self.chapter_id.clone(),
            generation: self.topics_generation,
        })
    }

    /// 返回 false 表示响应已过期被丢弃
    pub fn apply_chapters<E: Display>(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Chapter>, E>,
    ) -> bool {
        if ticket.level != CascadeLevel::Chapters
            || ticket.generation != self.chapters_generation
            || ticket.parent_id != self.class_id
        {
            debug!("丢弃过期的章节响应 (class {})", ticket.parent_id);
            return false;
        }
        self.chapters = Options::from_result(result);
        true
    }

    pub fn apply_topics<E: Display>(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Topic>, E>,
    ) -> bool {
        if ticket.level != CascadeLevel::Topics
            || ticket.generation != self.topics_generation
            || ticket.parent_id != self.chapter_id
        {
            debug!("丢弃过期的主题响应 (chapter {})", ticket.parent_id);
            return false;
        }
        self.topics = Options::from_result(result);
        true
    }

    // ========== 读取 ==========

    pub fn classes(&self) -> &Options<Class> {
        &self.classes
    }

    pub fn chapters(&self) -> &Options<Chapter> {
        &self.chapters
    }

    pub fn topics(&self) -> &Options<Topic> {
        &self.topics
    }

    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn group(&self) -> Option<Group> {
        self.group
    }

    /// 显示名称，找不到时退回原始 id
    pub fn class_name(&self) -> String {
        resolve_name(self.classes.items(), &self.class_id)
    }

    pub fn chapter_name(&self) -> String {
        resolve_name(self.chapters.items(), &self.chapter_id)
    }

    pub fn topic_name(&self) -> String {
        resolve_name(self.topics.items(), &self.topic_id)
    }

    /// (班级, 章节, 主题) 在各自列表中从 1 开始的位置
    pub fn ordinals(&self) -> (usize, usize, usize) {
        (
            resolve_ordinal(self.classes.items(), &self.class_id),
            resolve_ordinal(self.chapters.items(), &self.chapter_id),
            resolve_ordinal(self.topics.items(), &self.topic_id),
        )
    }
}

fn resolve_name<T: Named>(items: &[T], id: &str) -> String {
    items
        .iter()
        .find(|item| item.id() == id)
        .map(|item| item.display_name())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| id.to_string())
}

/// 列表里找不到时：数字 id 直接当序号，否则为 1
fn resolve_ordinal<T: Named>(items: &[T], id: &str) -> usize {
    items
        .iter()
        .position(|item| item.id() == id)
        .map(|pos| pos + 1)
        .or_else(|| id.parse().ok().filter(|n| *n > 0))
        .unwrap_or(1)
}

/// 用层级数据源驱动级联选择
pub struct CascadeLoader<'a, S: HierarchySource> {
    source: &'a S,
}

impl<'a, S: HierarchySource> CascadeLoader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub async fn load_classes(&self, cascade: &mut SelectionCascade) {
        cascade.begin_classes();
        let result = self.source.list_classes().await;
        log_fetch_failure("班级", &result);
        cascade.apply_classes(result);
    }

    /// 选择班级并加载章节
    pub async fn choose_class(&self, cascade: &mut SelectionCascade, class_id: &str) {
        cascade.select_class(class_id);
        if let Some(ticket) = cascade.chapters_request() {
            let result = self.source.list_chapters(&ticket.parent_id).await;
            log_fetch_failure("章节", &result);
            cascade.apply_chapters(&ticket, result);
        }
    }

    /// 选择章节并加载主题
    pub async fn choose_chapter(
        &self,
        cascade: &mut SelectionCascade,
        chapter_id: &str,
    ) -> Result<(), ConfigError> {
        cascade.select_chapter(chapter_id)?;
        if let Some(ticket) = cascade.topics_request() {
            let result = self.source.list_topics(&ticket.parent_id).await;
            log_fetch_failure("主题", &result);
            cascade.apply_topics(&ticket, result);
        }
        Ok(())
    }
}

fn log_fetch_failure<T>(what: &str, result: &AppResult<Vec<T>>) {
    if let Err(e) = result {
        warn!("⚠️ 获取{}列表失败: {}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Localized, TopicName};

    fn chapter(id: &str, uz: &str) -> Chapter {
        Chapter {
            id: id.to_string(),
            name: Localized::new(uz, ""),
            class_id: None,
        }
    }

    fn topic(id: &str, name: &str) -> Topic {
        Topic {
            id: id.to_string(),
            name: TopicName::Plain(name.to_string()),
            title: None,
            chapter_id: None,
        }
    }

    #[test]
    fn child_fetches_are_suppressed_until_parent_selected() {
        let mut cascade = SelectionCascade::new();
        assert_eq!(cascade.state(), CascadeState::NoneSelected);
        assert!(cascade.chapters_request().is_none());
        assert!(cascade.topics_request().is_none());
        assert_eq!(
            cascade.select_chapter("c1"),
            Err(ConfigError::MissingSelection { field: "class" })
        );
    }

    #[test]
    fn changing_class_resets_chapter_and_topic() {
        let mut cascade = SelectionCascade::new();
        cascade.select_class("1");
        let ticket = cascade.chapters_request().unwrap();
        assert!(cascade.apply_chapters(&ticket, Ok::<_, String>(vec![chapter("10", "Sonlar")])));
        cascade.select_chapter("10").unwrap();
        let ticket = cascade.topics_request().unwrap();
        assert!(cascade.apply_topics(&ticket, Ok::<_, String>(vec![topic("100", "Kasrlar")])));
        cascade.select_topic("100").unwrap();
        cascade.select_group(Group::C).unwrap();
        assert_eq!(cascade.state(), CascadeState::GroupSelected);

        cascade.select_class("2");

        assert_eq!(cascade.state(), CascadeState::ClassSelected);
        assert_eq!(cascade.chapter_id(), "");
        assert_eq!(cascade.topic_id(), "");
        assert_eq!(cascade.group(), None);
        assert_eq!(cascade.topics(), &Options::Idle);
        assert!(cascade.topics_request().is_none());

        let ticket = cascade.chapters_request().unwrap();
        assert_eq!(ticket.parent_id, "2");
        assert_eq!(cascade.chapters(), &Options::Loading);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut cascade = SelectionCascade::new();
        cascade.select_class("1");
        let stale = cascade.chapters_request().unwrap();
        cascade.select_class("2");
        let fresh = cascade.chapters_request().unwrap();

        assert!(cascade.apply_chapters(&fresh, Ok::<_, String>(vec![chapter("20", "Geometriya")])));
        assert!(!cascade.apply_chapters(&stale, Ok::<_, String>(vec![chapter("10", "Sonlar")])));
        assert_eq!(cascade.chapters().items()[0].id, "20");

        // 同一个班级重新选择后，旧凭据同样作废
        cascade.select_class("1");
        let first = cascade.chapters_request().unwrap();
        cascade.select_class("2");
        cascade.select_class("1");
        assert!(!cascade.apply_chapters(&first, Ok::<_, String>(Vec::new())));
    }

    #[test]
    fn empty_or_failed_fetch_disables_selector() {
        let mut cascade = SelectionCascade::new();
        cascade.select_class("1");
        let ticket = cascade.chapters_request().unwrap();
        cascade.apply_chapters(&ticket, Ok::<_, String>(Vec::new()));
        assert_eq!(cascade.chapters(), &Options::NotFound);
        assert!(cascade.chapters().is_disabled());

        cascade.select_class("3");
        let ticket = cascade.chapters_request().unwrap();
        cascade.apply_chapters(&ticket, Err::<Vec<Chapter>, _>("timeout"));
        assert_eq!(cascade.chapters(), &Options::Failed("timeout".to_string()));
    }

    #[test]
    fn names_fall_back_to_raw_ids() {
        let mut cascade = SelectionCascade::new();
        cascade.select_class("7");
        let ticket = cascade.chapters_request().unwrap();
        cascade.apply_chapters(
            &ticket,
            Ok::<_, String>(vec![chapter("a", "Birinchi"), chapter("b", "Ikkinchi")]),
        );
        cascade.select_chapter("b").unwrap();

        assert_eq!(cascade.class_name(), "7");
        assert_eq!(cascade.chapter_name(), "Ikkinchi");
        assert_eq!(cascade.ordinals(), (7, 2, 1));
    }

    #[test]
    fn group_requires_topic() {
        let mut cascade = SelectionCascade::new();
        assert!(cascade.select_group(Group::A).is_err());
        cascade.select_class("1");
        cascade.select_chapter("2").unwrap();
        cascade.select_topic("3").unwrap();
        assert!(cascade.is_ready(false));
        assert!(!cascade.is_ready(true));
        cascade.select_group(Group::A).unwrap();
        assert!(cascade.is_ready(true));
    }
}
