//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over completion providers, translating a
//! normalized [`LlmRequest`] into the provider's HTTP API and back into an
//! [`LlmResponse`].
//!
//! ```text
//! ChatModel ──► LlmRequest ──► with_backoff ──► Backend::complete() ──► LlmResponse
//!                                                     │
//!                                          ┌──────────┴──────────┐
//!                                     OpenAiBackend          MockBackend
//!                                 /v1/chat/completions     canned responses
//! ```

pub mod backoff;
pub mod mock;
pub mod openai;

pub use backoff::BackoffConfig;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;

use crate::error::Result;
use crate::ChainError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

/// A normalized, provider-agnostic completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// Model identifier (e.g. `"gpt-3.5-turbo"`).
    pub model: String,

    /// The fully rendered prompt, sent as a single user message.
    pub prompt: String,

    pub temperature: f64,

    pub max_tokens: Option<u32>,
}

/// A normalized completion response.
#[derive(Debug)]
pub struct LlmResponse {
    /// The generated text.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,
}

/// Abstraction over completion providers.
///
/// Object-safe; used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute one completion call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Whether `error` is a transient transport failure under `config`.
///
/// Retryable: [`ChainError::HttpError`] with a status in
/// `config.retryable_statuses`, and [`ChainError::Request`].
pub fn is_retryable(error: &ChainError, config: &BackoffConfig) -> bool {
    match error {
        ChainError::HttpError { status, .. } => config.retryable_statuses.contains(status),
        ChainError::Request(_) => true,
        _ => false,
    }
}

/// Call `backend` with transport-level retry.
///
/// Returns the first success, or the last error once retries are exhausted
/// or the error is not retryable. With [`BackoffConfig::none()`] the first
/// error is returned unchanged.
pub async fn with_backoff(
    backend: &dyn Backend,
    client: &Client,
    base_url: &str,
    request: &LlmRequest,
    config: &BackoffConfig,
) -> Result<LlmResponse> {
    let mut attempt = 0;
    loop {
        match backend.complete(client, base_url, request).await {
            Ok(response) => return Ok(response),
            Err(err) if attempt < config.max_retries && is_retryable(&err, config) => {
                let delay = match &err {
                    ChainError::HttpError {
                        retry_after: Some(hint),
                        ..
                    } if config.respect_retry_after => *hint,
                    _ => config.delay_for_attempt(attempt),
                };
                attempt += 1;
                warn!(
                    backend = backend.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying completion request"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
