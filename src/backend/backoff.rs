//! Exponential backoff with jitter for transient provider failures.
//!
//! The crate default is [`BackoffConfig::none()`]: a failed request is
//! reported on the first failure. Opt in to retries with one of the presets
//! or a hand-tuned config.

use std::time::Duration;

/// Statuses treated as transient by every preset.
const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry policy for completion requests.
///
/// # Example
///
/// ```
/// use llm_output_parsers::backend::BackoffConfig;
///
/// assert_eq!(BackoffConfig::default().max_retries, 0);
/// assert_eq!(BackoffConfig::standard().max_retries, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Retries after the first attempt. `0` disables retry.
    pub max_retries: u32,

    /// Base delay before the first retry.
    pub initial_delay: Duration,

    /// Growth factor per retry.
    pub multiplier: f64,

    /// Upper bound on any single delay.
    pub max_delay: Duration,

    pub jitter: JitterStrategy,

    /// HTTP statuses that are retried.
    pub retryable_statuses: Vec<u16>,

    /// Prefer the provider's `Retry-After` hint over the computed delay.
    pub respect_retry_after: bool,
}

/// How randomness is mixed into each delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterStrategy {
    /// Exactly the computed delay.
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// `delay / 2` plus uniform in `[0, delay / 2]`.
    Equal,
}

impl BackoffConfig {
    /// No retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::standard()
        }
    }

    /// 3 retries starting at 1s, doubling, capped at 60s.
    pub fn standard() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            jitter: JitterStrategy::Full,
            retryable_statuses: TRANSIENT_STATUSES.to_vec(),
            respect_retry_after: true,
        }
    }

    /// 2 quick retries for when someone is waiting on the answer.
    pub fn interactive() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_delay: Duration::from_secs(10),
            ..Self::standard()
        }
    }

    /// 5 retries starting at 500ms, capped at 120s, for batch runs.
    pub fn aggressive() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(120),
            ..Self::standard()
        }
    }

    /// Delay before retry number `attempt + 1` (0-indexed).
    ///
    /// `initial_delay * multiplier^attempt`, capped at `max_delay`, then jittered.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());

        let secs = match self.jitter {
            JitterStrategy::None => capped,
            JitterStrategy::Full => fastrand::f64() * capped,
            JitterStrategy::Equal => capped / 2.0 + fastrand::f64() * (capped / 2.0),
        };
        Duration::from_secs_f64(secs)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::none()
    }
}
