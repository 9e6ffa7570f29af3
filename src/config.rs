/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 题库 REST API 根地址
    pub api_base_url: String,
    /// Bearer token（为空则不附带 Authorization 头）
    pub api_token: Option<String>,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
    /// 导入任务 TOML 文件存放目录
    pub import_folder: String,
    /// 失败题目记录文件
    pub failure_log_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 列表分页大小
    pub page_size: usize,
    /// 列表查询语言（uz / ru）
    pub content_lang: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 全部成功的任务文件是否删除
    pub delete_completed_jobs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://35.154.102.246:8086/api".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            import_folder: "import_jobs".to_string(),
            failure_log_file: "failed_questions.txt".to_string(),
            output_log_file: "output.txt".to_string(),
            page_size: 10,
            content_lang: "uz".to_string(),
            verbose_logging: false,
            delete_completed_jobs: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            api_token: std::env::var("API_TOKEN").ok().filter(|t| !t.trim().is_empty()).or(default.api_token),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            import_folder: std::env::var("IMPORT_FOLDER").unwrap_or(default.import_folder),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(default.failure_log_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            page_size: std::env::var("PAGE_SIZE").ok().and_then(|v| v.parse().ok()).filter(|n: &usize| *n > 0).unwrap_or(default.page_size),
            content_lang: std::env::var("CONTENT_LANG").unwrap_or(default.content_lang),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            delete_completed_jobs: std::env::var("DELETE_COMPLETED_JOBS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.delete_completed_jobs),
        }
    }
}
