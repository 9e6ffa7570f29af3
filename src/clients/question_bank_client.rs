/// 题库 API 客户端
///
/// 封装所有与题库 REST API 相关的调用逻辑。
/// 读接口经过查询缓存，写接口成功后按实体标签失效缓存。
use crate::clients::gateway::{HierarchySource, QuestionGateway};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::{EntityTag, HttpExecutor, QueryCache};
use crate::models::{Chapter, Class, NamePayload, NewTopic, PageRequest, QuestionSummary, Topic};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// 题库 API 客户端
pub struct QuestionBankClient {
    executor: HttpExecutor,
    cache: Mutex<QueryCache>,
}

impl QuestionBankClient {
    /// 创建新的题库客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let executor = HttpExecutor::new(
            &config.api_base_url,
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::with_executor(executor))
    }

    pub fn with_executor(executor: HttpExecutor) -> Self {
        Self {
            executor,
            cache: Mutex::new(QueryCache::new()),
        }
    }

    // ========== 班级 ==========

    pub async fn get_class(&self, id: &str) -> AppResult<Class> {
        let value = self
            .cached_get(&format!("/classes/{}", id), Vec::new(), EntityTag::Class)
            .await?;
        Ok(serde_json::from_value(unwrap_data(value))?)
    }

    pub async fn create_class(&self, payload: &NamePayload) -> AppResult<Value> {
        let body = serde_json::to_value(payload)?;
        let result = self.executor.post("/classes", &body).await;
        self.after_mutation(EntityTag::Class, result).await
    }

    pub async fn update_class(&self, id: &str, payload: &NamePayload) -> AppResult<Value> {
        let body = serde_json::to_value(payload)?;
        let result = self
            .executor
            .put(&format!("/update_classes/{}", id), &body)
            .await;
        self.after_mutation(EntityTag::Class, result).await
    }

    pub async fn delete_class(&self, id: &str) -> AppResult<Value> {
        let result = self.executor.delete(&format!("/classes/{}", id)).await;
        self.after_mutation(EntityTag::Class, result).await
    }

    // ========== 章节 ==========

    pub async fn create_chapter(&self, payload: &NamePayload) -> AppResult<Value> {
        let body = serde_json::to_value(payload)?;
        let result = self.executor.post("/chapters", &body).await;
        self.after_mutation(EntityTag::Chapter, result).await
    }

    pub async fn update_chapter(&self, id: &str, payload: &NamePayload) -> AppResult<Value> {
        let body = serde_json::to_value(payload)?;
        let result = self
            .executor
            .put(&format!("/update_chapter/{}", id), &body)
            .await;
        self.after_mutation(EntityTag::Chapter, result).await
    }

    pub async fn delete_chapter(&self, id: &str) -> AppResult<Value> {
        let result = self.executor.delete(&format!("/chapter/{}", id)).await;
        self.after_mutation(EntityTag::Chapter, result).await
    }

    // ========== 主题 ==========

    pub async fn list_all_topics(&self, lang: &str) -> AppResult<Vec<Topic>> {
        let value = self
            .cached_get(
                "/gettopics",
                vec![("language", lang.to_string())],
                EntityTag::Topic,
            )
            .await?;
        parse_list(value)
    }

    pub async fn create_topic(&self, topic: &NewTopic) -> AppResult<Value> {
        let body = serde_json::to_value(topic)?;
        let result = self.executor.post("/topics", &body).await;
        self.after_mutation(EntityTag::Topic, result).await
    }

    pub async fn delete_topic(&self, id: &str) -> AppResult<Value> {
        let result = self.executor.delete(&format!("/topics/{}", id)).await;
        self.after_mutation(EntityTag::Topic, result).await
    }

    // ========== 题目 ==========

    /// 全部题目分页
    pub async fn list_questions(&self, page: PageRequest) -> AppResult<Vec<QuestionSummary>> {
        let value = self
            .cached_get("/getquestions", page.query(), EntityTag::Question)
            .await?;
        parse_list(value)
    }

    /// 某个主题下的题目分页
    pub async fn list_questions_by_topic(
        &self,
        topic_id: &str,
        page: PageRequest,
        lang: &str,
    ) -> AppResult<Vec<QuestionSummary>> {
        let mut query = page.query();
        query.push(("lang", lang.to_string()));
        let value = self
            .cached_get(
                &format!("/questions/get/{}", topic_id),
                query,
                EntityTag::Question,
            )
            .await?;
        parse_list(value)
    }

    pub async fn get_question(&self, id: &str) -> AppResult<Value> {
        let value = self
            .cached_get(&format!("/questions/{}", id), Vec::new(), EntityTag::Question)
            .await?;
        Ok(unwrap_data(value))
    }

    pub async fn delete_question(&self, id: &str) -> AppResult<Value> {
        let result = self.executor.delete(&format!("/questions/{}", id)).await;
        self.after_mutation(EntityTag::Question, result).await
    }

    // ========== 辅助方法 ==========

    /// 当前缓存条目数
    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn cached_get(
        &self,
        endpoint: &str,
        query: Vec<(&str, String)>,
        tag: EntityTag,
    ) -> AppResult<Value> {
        let key = QueryCache::key(endpoint, &query);
        if let Some(hit) = self.cache.lock().await.get(&key).cloned() {
            debug!("缓存命中: {}", key);
            return Ok(hit);
        }

        let value = self.executor.get(endpoint, &query).await?;
        self.cache.lock().await.insert(key, tag, value.clone());
        Ok(value)
    }

    /// 写操作成功后同步失效对应标签
    async fn after_mutation(&self, tag: EntityTag, result: AppResult<Value>) -> AppResult<Value> {
        let value = result?;
        let dropped = self.cache.lock().await.invalidate(tag);
        debug!("{} 写入成功，失效 {} 条缓存", tag, dropped);
        Ok(value)
    }
}

impl QuestionGateway for QuestionBankClient {
    async fn create_question(&self, body: &Value) -> AppResult<Value> {
        let result = self.executor.post("/questions", body).await;
        self.after_mutation(EntityTag::Question, result).await
    }
}

impl HierarchySource for QuestionBankClient {
    async fn list_classes(&self) -> AppResult<Vec<Class>> {
        let value = self.cached_get("/class", Vec::new(), EntityTag::Class).await?;
        parse_list(value)
    }

    async fn list_chapters(&self, class_id: &str) -> AppResult<Vec<Chapter>> {
        let value = self
            .cached_get(
                &format!("/chapters/class/{}", class_id),
                vec![("class_id", class_id.to_string())],
                EntityTag::Chapter,
            )
            .await?;
        parse_list(value)
    }

    async fn list_topics(&self, chapter_id: &str) -> AppResult<Vec<Topic>> {
        let value = self
            .cached_get(
                &format!("/chapter/{}/topics", chapter_id),
                Vec::new(),
                EntityTag::Topic,
            )
            .await?;
        parse_list(value)
    }
}

/// 部分接口把结果包在 `data` 里
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// 列表响应：数组，或 `{data|items|results: [...]}`；null 视为空列表
fn parse_list<T: DeserializeOwned>(value: Value) -> AppResult<Vec<T>> {
    let list = match value {
        Value::Null => json!([]),
        Value::Array(_) => value,
        Value::Object(mut map) => ["data", "items", "results"]
            .iter()
            .find_map(|key| map.remove(*key).filter(Value::is_array))
            .ok_or_else(|| {
                AppError::Api(ApiError::UnexpectedShape {
                    detail: "列表响应中没有找到数组".to_string(),
                })
            })?,
        other => {
            return Err(AppError::Api(ApiError::UnexpectedShape {
                detail: other.to_string(),
            }));
        }
    };
    Ok(serde_json::from_value(list)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_accepts_wrapped_and_bare_arrays() {
        let bare: Vec<Class> =
            parse_list(json!([{ "id": 1, "name": { "uz": "1-sinf", "ru": "1 класс" } }])).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped: Vec<Class> = parse_list(json!({
            "data": [{ "id": "2", "name": { "uz": "2-sinf", "ru": "2 класс" } }],
            "total": 1
        }))
        .unwrap();
        assert_eq!(wrapped[0].id, "2");

        let empty: Vec<Class> = parse_list(Value::Null).unwrap();
        assert!(empty.is_empty());

        assert!(parse_list::<Class>(json!({ "total": 0 })).is_err());
    }

    #[test]
    fn unwrap_data_only_touches_wrapped_objects() {
        assert_eq!(unwrap_data(json!({ "data": { "id": 1 } })), json!({ "id": 1 }));
        assert_eq!(unwrap_data(json!({ "id": 1 })), json!({ "id": 1 }));
    }

    // ========== 本地桩服务 ==========

    use std::sync::atomic::{AtomicU16, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Hits = Arc<std::sync::Mutex<Vec<String>>>;

    /// 启动一个只认识少数路由的 HTTP 桩，返回根地址和请求记录
    async fn spawn_stub(create_status: Arc<AtomicU16>) -> (String, Hits) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits: Hits = Arc::default();

        let recorded = hits.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, recorded.clone(), create_status.clone()));
            }
        });

        (base_url, hits)
    }

    async fn serve(mut socket: TcpStream, hits: Hits, create_status: Arc<AtomicU16>) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let path = request_line
            .next()
            .unwrap_or_default()
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        hits.lock().unwrap().push(format!("{} {}", method, path));

        let (status, reason, body) = match (method.as_str(), path.as_str()) {
            ("POST", "/questions") if create_status.load(Ordering::SeqCst) == 201 => {
                (201, "Created", r#"{"id":1}"#)
            }
            ("POST", "/questions") => (422, "Unprocessable Entity", r#"{"detail":"duplicate question"}"#),
            _ => (200, "OK", "[]"),
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    }

    fn count(hits: &Hits, request: &str) -> usize {
        hits.lock().unwrap().iter().filter(|h| *h == request).count()
    }

    #[tokio::test]
    async fn writes_invalidate_only_their_own_tag() {
        let create_status = Arc::new(AtomicU16::new(201));
        let (base_url, hits) = spawn_stub(create_status.clone()).await;
        let executor = HttpExecutor::new(&base_url, None, Duration::from_secs(5)).unwrap();
        let client = QuestionBankClient::with_executor(executor);
        let page = PageRequest { limit: 10, offset: 0 };

        // 相同查询只请求一次
        client.list_questions(page).await.unwrap();
        client.list_questions(page).await.unwrap();
        client.list_classes().await.unwrap();
        assert_eq!(count(&hits, "GET /getquestions"), 1);
        assert_eq!(count(&hits, "GET /class"), 1);
        assert_eq!(client.cached_entries().await, 2);

        // 创建成功：题目列表失效，班级列表保留
        client.create_question(&json!({ "topic_id": "T1" })).await.unwrap();
        assert_eq!(client.cached_entries().await, 1);
        client.list_questions(page).await.unwrap();
        client.list_classes().await.unwrap();
        assert_eq!(count(&hits, "GET /getquestions"), 2);
        assert_eq!(count(&hits, "GET /class"), 1);

        // 创建失败：缓存不动
        create_status.store(422, Ordering::SeqCst);
        let err = client
            .create_question(&json!({ "topic_id": "T1" }))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Api(ApiError::BadResponse { status: 422, .. })
        ));
        assert_eq!(client.cached_entries().await, 2);
        client.list_questions(page).await.unwrap();
        assert_eq!(count(&hits, "GET /getquestions"), 2);

        // 删除班级只失效班级
        client.delete_class("1").await.unwrap();
        assert_eq!(client.cached_entries().await, 1);
        client.list_classes().await.unwrap();
        assert_eq!(count(&hits, "GET /class"), 2);
        assert_eq!(count(&hits, "POST /questions"), 2);
    }

    /// 需要可访问的题库 API：cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_list_classes_live() {
        let config = Config::from_env();
        let client = QuestionBankClient::new(&config).expect("创建客户端失败");
        let classes = client.list_classes().await.expect("获取班级失败");
        println!("找到 {} 个班级", classes.len());
        assert!(client.cached_entries().await >= 1);
    }
}
