//! Offline backend for tests and demos.
//!
//! [`MockBackend`] returns canned completions in order and records every
//! prompt it was sent, so a chain can be exercised end to end without a
//! network.
//!
//! # Example
//!
//! ```
//! use llm_output_parsers::backend::MockBackend;
//!
//! let mock = MockBackend::new(vec!["mango, papaya".to_string()]);
//! assert!(mock.prompts().is_empty());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, LlmRequest, LlmResponse};
use crate::error::Result;
use crate::ChainError;

/// A backend that replays canned responses, cycling when exhausted.
#[derive(Debug)]
pub struct MockBackend {
    responses: Vec<String>,
    index: AtomicUsize,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    failure: Option<ScriptedFailure>,
}

#[derive(Debug, Clone, Copy)]
struct ScriptedFailure {
    first_calls: usize,
    status: u16,
}

impl MockBackend {
    /// Canned responses, returned in order. An empty list yields empty completions.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            index: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Always return the same completion.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Answer the first `calls` requests with an HTTP error of `status`.
    pub fn failing_first(mut self, calls: usize, status: u16) -> Self {
        self.failure = Some(ScriptedFailure {
            first_calls: calls,
            status,
        });
        self
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Number of `complete` calls, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn next_response(&self) -> String {
        if self.responses.is_empty() {
            return String::new();
        }
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        self.responses[idx].clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }

        if let Some(failure) = self.failure {
            if call < failure.first_calls {
                return Err(ChainError::HttpError {
                    status: failure.status,
                    body: format!("scripted failure {}", call + 1),
                    retry_after: None,
                });
            }
        }

        Ok(LlmResponse {
            text: self.next_response(),
            status: 200,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> LlmRequest {
        LlmRequest {
            model: "test".to_string(),
            prompt: prompt.to_string(),
            temperature: 0.0,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn test_mock_fixed_response() {
        let mock = MockBackend::fixed("Hello!");
        let resp = mock
            .complete(&Client::new(), "http://unused", &request("hi"))
            .await
            .unwrap();
        assert_eq!(resp.text, "Hello!");
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn test_mock_cycles_and_records() {
        let mock = MockBackend::new(vec!["first".into(), "second".into()]);
        let client = Client::new();
        let mut texts = Vec::new();
        for p in ["a", "b", "c"] {
            texts.push(mock.complete(&client, "http://unused", &request(p)).await.unwrap().text);
        }
        assert_eq!(texts, ["first", "second", "first"]);
        assert_eq!(mock.prompts(), ["a", "b", "c"]);
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_scripted_failure_then_success() {
        let mock = MockBackend::fixed("ok").failing_first(1, 401);
        let client = Client::new();
        let err = mock
            .complete(&client, "http://unused", &request("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::HttpError { status: 401, .. }));
        let resp = mock.complete(&client, "http://unused", &request("x")).await.unwrap();
        assert_eq!(resp.text, "ok");
    }

    #[tokio::test]
    async fn test_empty_responses() {
        let mock = MockBackend::new(Vec::new());
        let resp = mock
            .complete(&Client::new(), "http://unused", &request("x"))
            .await
            .unwrap();
        assert_eq!(resp.text, "");
    }
}
