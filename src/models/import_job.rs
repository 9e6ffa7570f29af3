use serde::{Deserialize, Serialize};

/// 一次批量导入任务（对应一个 TOML 文件）
///
/// `code` 是粘贴进来的题目数组文本，可以不是严格 JSON，导入时会先尝试修复。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub chapter_id: String,
    #[serde(default)]
    pub topic_id: String,
    /// 分组 A-E，只有嵌套结构需要
    #[serde(default)]
    pub group: Option<String>,
    /// 本批第一道题的序号
    #[serde(default = "default_count")]
    pub count: usize,
    pub code: String,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

fn default_count() -> usize {
    1
}

impl ImportJob {
    /// 日志中显示的名称：优先 name，其次文件名
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_ref().filter(|n| !n.trim().is_empty()) {
            return name.clone();
        }
        self.file_path
            .as_deref()
            .and_then(|p| std::path::Path::new(p).file_name())
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("topic {}", self.topic_id))
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}
