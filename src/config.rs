//! Model and connection settings.

use std::time::Duration;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Default provider root; backends append their own paths.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Configuration for the chat model and its HTTP connection.
///
/// # Example
///
/// ```
/// use llm_output_parsers::ModelConfig;
///
/// let config = ModelConfig::default()
///     .with_model("gpt-4o-mini")
///     .with_temperature(0.0)
///     .with_api_key("sk-test");
/// assert_eq!(config.temperature, 0.0);
/// ```
#[derive(Clone)]
pub struct ModelConfig {
    /// Model identifier sent with every request.
    pub model: String,

    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f64,

    /// Completion length cap. `None` leaves it to the provider.
    pub max_tokens: Option<u32>,

    pub base_url: String,

    /// Sent as `Authorization: Bearer {key}` when set.
    pub api_key: Option<String>,

    /// Sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            organization: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(redact))
            .field("organization", &self.organization)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModelConfig {
    /// Read settings from the process environment, loading `.env` first if present.
    ///
    /// Recognized variables: `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `OPENAI_MODEL`, `OPENAI_ORGANIZATION`. Unset variables keep their
    /// defaults. The key is not validated here; a bad or missing key shows up
    /// as the provider's 401.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            model: present("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: present("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: present("OPENAI_API_KEY"),
            organization: present("OPENAI_ORGANIZATION"),
            ..defaults
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Keep a short prefix of a secret for log correlation.
pub(crate) fn redact(secret: &str) -> String {
    match secret.char_indices().nth(6) {
        Some((cut, _)) => format!("{}***", &secret[..cut]),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.base_url, "https://api.openai.com");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_lookup_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-abcdefghij"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_BASE_URL", "http://localhost:8000"),
            ("OPENAI_ORGANIZATION", ""),
        ]
        .into_iter()
        .collect();
        let config = ModelConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.api_key.as_deref(), Some("sk-abcdefghij"));
        assert!(config.organization.is_none());
    }

    #[test]
    fn test_missing_key_is_not_an_error() {
        let config = ModelConfig::from_lookup(|_| None);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ModelConfig::default().with_api_key("sk-secret-value-123");
        let shown = format!("{:?}", config);
        assert!(shown.contains("sk-sec***"));
        assert!(!shown.contains("secret-value-123"));
    }

    #[test]
    fn test_redact_short() {
        assert_eq!(redact("abc"), "***");
    }
}
