use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// API 调用错误
    Api(ApiError),
    /// 批量导入错误（整批中止）
    Import(ImportError),
    /// 配置错误
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::Import(e) => write!(f, "导入错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Import(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// API 调用错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回非 2xx 响应
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 响应是合法 JSON，但结构不符合预期
    UnexpectedShape { detail: String },
}

impl ApiError {
    /// 面向用户的简短描述（用于逐题失败报告）
    pub fn summary(&self) -> String {
        match self {
            ApiError::BadResponse {
                status,
                message: Some(message),
                ..
            } => format!("HTTP {}: {}", status, message),
            ApiError::BadResponse { status, .. } => format!("HTTP {}", status),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { endpoint, source } => {
                write!(f, "API请求失败 ({}): {}", endpoint, source)
            }
            ApiError::BadResponse {
                endpoint,
                status,
                message,
            } => {
                write!(
                    f,
                    "API返回错误响应 ({}): status={}, message={:?}",
                    endpoint, status, message
                )
            }
            ApiError::JsonParseFailed { source } => {
                write!(f, "JSON解析失败: {}", source)
            }
            ApiError::UnexpectedShape { detail } => write!(f, "响应格式不正确: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 导入任务缺少必填的选择项
    MissingSelection { field: &'static str },
    /// 分组不在 A-E 范围内
    InvalidGroup { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSelection { field } => write!(f, "必须先选择 {}", field),
            ConfigError::InvalidGroup { value } => {
                write!(f, "分组 '{}' 无效，只允许 A/B/C/D/E", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 整批导入中止的错误（文档级别，不做逐题恢复）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("导入内容为空")]
    EmptyBuffer,

    #[error("JSON 解析失败（已尝试自动修复）: {0}")]
    ParseFailed(String),

    #[error("导入内容不是 JSON 数组")]
    NotAnArray,

    #[error("未选择主题，无法提交")]
    MissingTopic,
}

/// 单个题目的失败原因，不影响同批其他题目
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemFailure {
    #[error("题目格式无效: {reason}")]
    Invalid { reason: String },

    #[error("有效选项不足: 需要至少 2 个，实际 {found} 个")]
    InsufficientOptions { found: usize },

    #[error("服务器拒绝: {message}")]
    Rejected { message: String },
}

impl ItemFailure {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ItemFailure::Invalid {
            reason: reason.into(),
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err.url().map(|u| u.path().to_string()).unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::Import(err)
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 面向用户的简短描述
    pub fn summary(&self) -> String {
        match self {
            AppError::Api(e) => e.summary(),
            other => other.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_response_summary_includes_message() {
        let err = AppError::Api(ApiError::BadResponse {
            endpoint: "/questions".to_string(),
            status: 422,
            message: Some("topic_id is required".to_string()),
        });
        assert_eq!(err.summary(), "HTTP 422: topic_id is required");
    }

    #[test]
    fn import_and_config_errors_convert() {
        fn parse() -> AppResult<()> {
            Err::<(), _>(ImportError::NotAnArray)?;
            Ok(())
        }
        assert!(matches!(parse(), Err(AppError::Import(ImportError::NotAnArray))));

        let err: AppError = ConfigError::MissingSelection { field: "topic" }.into();
        assert_eq!(err.summary(), "配置错误: 必须先选择 topic");
    }

    #[test]
    fn item_failure_messages_are_distinct() {
        let insufficient = ItemFailure::InsufficientOptions { found: 1 };
        let invalid = ItemFailure::invalid("缺少 question_type");
        assert!(insufficient.to_string().contains("有效选项不足"));
        assert!(invalid.to_string().contains("缺少 question_type"));
        assert_ne!(insufficient, invalid);
    }
}
