//! The chat model handle used by chains.
//!
//! [`ChatModel`] carries the HTTP client, provider base URL, backend, retry
//! policy and [`ModelConfig`]. It is cheap to clone and meant to be built
//! once and shared.

use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::backend::{with_backoff, Backend, BackoffConfig, LlmRequest, MockBackend, OpenAiBackend};
use crate::config::ModelConfig;
use crate::error::Result;

/// A configured completion model.
///
/// # Example
///
/// ```
/// use llm_output_parsers::{ChatModel, ModelConfig};
///
/// # fn main() -> llm_output_parsers::Result<()> {
/// let model = ChatModel::builder(ModelConfig::default())
///     .mock(vec!["red, green, blue".to_string()])
///     .build()?;
/// let strict = model.with_temperature(0.0);
/// assert_eq!(strict.config().temperature, 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChatModel {
    client: Client,
    base_url: String,
    backend: Arc<dyn Backend>,
    backoff: BackoffConfig,
    config: ModelConfig,
}

impl ChatModel {
    pub fn builder(config: ModelConfig) -> ChatModelBuilder {
        ChatModelBuilder {
            config,
            client: None,
            backend: None,
            backoff: None,
        }
    }

    /// OpenAI backend with credentials from `config` and no retry.
    pub fn from_config(config: ModelConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// A copy sampling at `temperature`; client and backend are shared.
    pub fn with_temperature(&self, temperature: f64) -> Self {
        let mut model = self.clone();
        model.config.temperature = temperature;
        model
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Send `prompt` as one user message and return the completion text.
    pub async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = LlmRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        debug!(
            backend = self.backend.name(),
            model = %request.model,
            temperature = request.temperature,
            prompt_len = prompt.len(),
            "invoking model"
        );

        let response = with_backoff(
            self.backend.as_ref(),
            &self.client,
            &self.base_url,
            &request,
            &self.backoff,
        )
        .await?;

        debug!(status = response.status, completion_len = response.text.len(), "completion received");
        Ok(response.text)
    }
}

impl std::fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("backoff", &self.backoff)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`ChatModel`].
pub struct ChatModelBuilder {
    config: ModelConfig,
    client: Option<Client>,
    backend: Option<Arc<dyn Backend>>,
    backoff: Option<BackoffConfig>,
}

impl ChatModelBuilder {
    /// Use a preconfigured HTTP client; the config's timeout is then not applied.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Default: [`OpenAiBackend`] built from the config's credentials.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replay canned completions instead of calling a provider.
    pub fn mock(self, responses: Vec<String>) -> Self {
        self.backend(Arc::new(MockBackend::new(responses)))
    }

    /// Default: [`BackoffConfig::none()`].
    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff = Some(config);
        self
    }

    pub fn build(self) -> Result<ChatModel> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder().timeout(self.config.timeout).build()?,
        };
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(OpenAiBackend::from_config(&self.config)));

        Ok(ChatModel {
            client,
            base_url: normalize_base_url(&self.config.base_url),
            backend,
            backoff: self.backoff.unwrap_or_default(),
            config: self.config,
        })
    }
}

/// Strip endpoint suffixes so the backend can append its own path.
/// e.g. "https://api.openai.com/v1" -> "https://api.openai.com"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    for suffix in ["/v1/chat/completions", "/v1/chat", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}
