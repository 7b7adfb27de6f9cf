use std::time::Duration;
use thiserror::Error;

use crate::output_parser::ParseError;
use crate::prompt::TemplateError;

/// Errors produced while running a prompt → model → parser chain.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The prompt template could not be rendered.
    #[error("prompt template error: {0}")]
    Template(#[from] TemplateError),

    /// The model's completion did not match the parser's expected shape.
    #[error("output parsing failed: {0}")]
    Parse(#[from] ParseError),

    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Backend`](crate::backend::Backend) implementations when
    /// the provider answers with a non-success status (bad key, quota,
    /// rate limit, outage). The `retry_after` field is populated from the
    /// `Retry-After` response header when present.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 401, 429, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ChainError {
    fn from(err: anyhow::Error) -> Self {
        ChainError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
