//! Backend for OpenAI-compatible chat completion APIs.
//!
//! Endpoint: `{base_url}/v1/chat/completions`. The rendered prompt is sent
//! as a single user message; the completion is
//! `choices[0].message.content`.

use super::{Backend, LlmRequest, LlmResponse};
use crate::config::{redact, ModelConfig};
use crate::error::Result;
use crate::ChainError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Backend for any OpenAI-compatible API.
///
/// # Example
///
/// ```
/// use llm_output_parsers::backend::OpenAiBackend;
///
/// let backend = OpenAiBackend::new().with_api_key("sk-...");
/// assert!(backend.has_api_key());
/// ```
#[derive(Clone, Default)]
pub struct OpenAiBackend {
    api_key: Option<String>,
    organization: Option<String>,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("api_key", &self.api_key.as_deref().map(redact))
            .field("organization", &self.organization)
            .finish()
    }
}

impl OpenAiBackend {
    /// A backend without credentials (local OpenAI-compatible servers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Credentials taken from `config`.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            organization: config.organization.clone(),
        }
    }

    /// Sent as `Authorization: Bearer {key}`.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sent as `OpenAI-Organization: {org}`.
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_organization(&self) -> bool {
        self.organization.is_some()
    }

    fn build_body(request: &LlmRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// `Retry-After` in delta-seconds form; HTTP-date values are ignored.
    fn parse_retry_after(value: &str) -> Option<Duration> {
        value.trim().parse::<u64>().ok().map(Duration::from_secs)
    }

    fn extract_text(json_resp: &Value) -> Option<&str> {
        json_resp
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
    }

}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
        let body = Self::build_body(request);

        let mut http = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http = http.bearer_auth(key);
        }
        if let Some(ref org) = self.organization {
            http = http.header("OpenAI-Organization", org.as_str());
        }

        debug!(backend = self.name(), %url, model = %request.model, "sending completion request");
        let resp = http.send().await?;
        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(Self::parse_retry_after);
            let body = resp.text().await.unwrap_or_default();
            return Err(ChainError::HttpError {
                status,
                body,
                retry_after,
            });
        }

        let json_resp: Value = resp.json().await?;
        let text = Self::extract_text(&json_resp).ok_or_else(|| {
            ChainError::Other("completion response has no choices[0].message.content".into())
        })?;

        if let Some(tokens) = json_resp.pointer("/usage/total_tokens").and_then(Value::as_u64) {
            debug!(backend = self.name(), total_tokens = tokens, "completion usage");
        }

        Ok(LlmResponse {
            text: text.to_string(),
            status,
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_request() -> LlmRequest {
        LlmRequest {
            model: "gpt-3.5-turbo".into(),
            prompt: "Why is the sky blue?".into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    #[test]
    fn test_body_single_user_message() {
        let body = OpenAiBackend::build_body(&test_request());
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.7);
        let messages = body["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Why is the sky blue?");
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_body_max_tokens() {
        let mut request = test_request();
        request.max_tokens = Some(256);
        assert_eq!(OpenAiBackend::build_body(&request)["max_tokens"], 256);
    }

    #[test]
    fn test_extract_text() {
        let resp = json!({
            "id": "chatcmpl-1",
            "choices": [{"message": {"role": "assistant", "content": "mango, papaya"}}],
            "usage": {"total_tokens": 12}
        });
        assert_eq!(OpenAiBackend::extract_text(&resp), Some("mango, papaya"));
        assert!(OpenAiBackend::extract_text(&json!({"choices": []})).is_none());
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(
            OpenAiBackend::parse_retry_after(" 30 "),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            OpenAiBackend::parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            None
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let backend = OpenAiBackend::new()
            .with_api_key("sk-1234567890abcdef")
            .with_organization("org-1");
        let debug = format!("{:?}", backend);
        assert!(debug.contains("sk-123***"));
        assert!(!debug.contains("567890abcdef"));
    }

    #[test]
    fn test_from_config() {
        let config = ModelConfig::default().with_api_key("sk-x");
        let backend = OpenAiBackend::from_config(&config);
        assert!(backend.has_api_key());
        assert!(!backend.has_organization());
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    /// Serve one canned HTTP response on a local port; returns the base URL
    /// and a handle yielding the raw request.
    async fn serve_once(
        status_line: &'static str,
        headers: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\n{headers}Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });
        (base_url, handle)
    }

    #[tokio::test]
    async fn test_rate_limit_becomes_http_error() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 429 Too Many Requests",
            "Retry-After: 7\r\n",
            r#"{"error": {"message": "Rate limit reached"}}"#,
        )
        .await;
        let err = OpenAiBackend::new()
            .with_api_key("sk-test")
            .complete(&local_client(), &base_url, &test_request())
            .await
            .unwrap_err();
        match err {
            ChainError::HttpError {
                status,
                body,
                retry_after,
            } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit reached"));
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected HttpError, got {other:?}"),
        }
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    }

    #[tokio::test]
    async fn test_success_returns_message_content() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            "",
            r#"{"choices": [{"message": {"role": "assistant", "content": "mango, papaya"}}], "usage": {"total_tokens": 9}}"#,
        )
        .await;
        let resp = OpenAiBackend::new()
            .complete(&local_client(), &base_url, &test_request())
            .await
            .unwrap();
        assert_eq!(resp.text, "mango, papaya");
        assert_eq!(resp.status, 200);
        let request = server.await.unwrap();
        assert!(request.contains("Why is the sky blue?"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_request_error() {
        let (base_url, _server) = serve_once("HTTP/1.1 200 OK", "", "not json").await;
        let err = OpenAiBackend::new()
            .complete(&local_client(), &base_url, &test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Request(ref e) if e.is_decode()));
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let err = OpenAiBackend::new()
            .complete(&client, "http://127.0.0.1:9", &test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Request(_)));
    }
}
