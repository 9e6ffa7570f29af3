//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 reqwest Client，只暴露"发请求"的能力

use crate::error::{ApiError, AppError, AppResult};
use reqwest::{header, Client, Method};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 Client、根地址和 token
/// - 为每个请求附带 JSON 与 Bearer 头
/// - 不认识 Question / Topic
/// - 不处理业务流程
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpExecutor {
    /// 创建新的 HTTP 执行器
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::api_request_failed(base_url, e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> AppResult<JsonValue> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &JsonValue) -> AppResult<JsonValue> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> AppResult<JsonValue> {
        self.send(Method::DELETE, path, &[], None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> AppResult<JsonValue> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {} query={:?}", method, url, query);

        let mut request = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        if !status.is_success() {
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message: extract_message(&text),
            }));
        }

        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// 从错误响应体中提取可读信息
fn extract_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<JsonValue>(body) {
        Ok(json) => ["message", "detail", "error"]
            .iter()
            .find_map(|key| json.get(*key))
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .or_else(|| Some(json.to_string())),
        Err(_) => Some(body.trim().to_string()),
    }
}
