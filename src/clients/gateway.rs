//! 客户端能力接口
//!
//! 导入流程和级联选择只依赖这里的 trait，测试时可以替换为内存实现。

use crate::error::AppResult;
use crate::models::{Chapter, Class, Topic};
use serde_json::Value as JsonValue;
use std::future::Future;

/// 创建单个题目的能力
pub trait QuestionGateway {
    fn create_question(
        &self,
        body: &JsonValue,
    ) -> impl Future<Output = AppResult<JsonValue>> + Send;
}

/// 班级 → 章节 → 主题 层级查询能力
pub trait HierarchySource {
    fn list_classes(&self) -> impl Future<Output = AppResult<Vec<Class>>> + Send;

    fn list_chapters(
        &self,
        class_id: &str,
    ) -> impl Future<Output = AppResult<Vec<Chapter>>> + Send;

    fn list_topics(
        &self,
        chapter_id: &str,
    ) -> impl Future<Output = AppResult<Vec<Topic>>> + Send;
}
