use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE}, Client};
use tracing::{debug, error, info};
use url::Url;

use crate::chat::types::{ChatReply, ChatRequest};
use crate::error::{Error, Result};

/// The remote service that answers chat messages.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, request: ChatRequest) -> Result<ChatReply>;

    /// Where requests go, for display.
    fn endpoint(&self) -> &str;
}

/// Connection settings for [`HttpAnswerService`]
#[derive(Debug, Clone)]
pub struct AnswerServiceConfig {
    pub base_url: String,
    pub chat_path: String,
    pub timeout: Duration,
}

impl Default for AnswerServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/chat".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// `POST /chat` over reqwest, one JSON request and one JSON response.
pub struct HttpAnswerService {
    client: Client,
    chat_url: Url,
}

impl HttpAnswerService {
    pub fn new(config: &AnswerServiceConfig) -> Result<Self> {
        let chat_url = Self::chat_url(&config.base_url, &config.chat_path)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(Self::create_headers())
            .build()
            .map_err(|e| Error::platform(format!("Failed to create HTTP client: {}", e)))?;

        info!("Answer service endpoint: {}", chat_url);

        Ok(Self { client, chat_url })
    }

    /// `chat_path` is always resolved below the base URL's path, so
    /// `http://host/api` with `/chat` posts to `http://host/api/chat`.
    fn chat_url(base_url: &str, chat_path: &str) -> Result<Url> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(chat_path.trim_start_matches('/'))?)
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, request: ChatRequest) -> Result<ChatReply> {
        debug!(
            "Sending chat request: session={}, chars={}",
            request.session_id,
            request.message.chars().count()
        );

        let start_time = Instant::now();

        let response = self
            .client
            .post(self.chat_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Answer service responded {} in {:?}", status, start_time.elapsed());

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Answer service error: {} - {}", status, error_text);
            return Err(Error::service(status.as_u16(), error_text));
        }

        let body = response.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&body)?;

        debug!(
            "Received answer: chars={}, sources={}",
            reply.answer.chars().count(),
            reply.sources.len()
        );
        Ok(reply)
    }

    fn endpoint(&self) -> &str {
        self.chat_url.as_str()
    }
}
