//! 查询缓存 - 基础设施层
//!
//! 以"接口名 + 序列化参数"为 key 缓存列表查询结果；
//! 写操作成功后按实体标签同步失效。

use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 实体标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityTag {
    Class,
    Chapter,
    Topic,
    Question,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityTag::Class => "Class",
            EntityTag::Chapter => "Chapter",
            EntityTag::Topic => "Topic",
            EntityTag::Question => "Question",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, JsonValue>,
    by_tag: HashMap<EntityTag, HashSet<String>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 缓存 key：`endpoint?k=v&k=v`，参数按给定顺序拼接
    pub fn key(endpoint: &str, args: &[(&str, String)]) -> String {
        if args.is_empty() {
            return endpoint.to_string();
        }
        let joined = args
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", endpoint, joined)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, tag: EntityTag, value: JsonValue) {
        self.by_tag.entry(tag).or_default().insert(key.clone());
        self.entries.insert(key, value);
    }

    /// 丢弃该标签下登记的全部 key，返回丢弃数量
    pub fn invalidate(&mut self, tag: EntityTag) -> usize {
        let Some(keys) = self.by_tag.remove(&tag) else {
            return 0;
        };
        keys.iter()
            .filter(|key| self.entries.remove(key.as_str()).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
