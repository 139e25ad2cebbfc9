//! Retry policy and failure classification
//!
//! Every outbound request goes through the same three-way classification:
//! success, retriable failure (429 and 5xx), or fatal failure (any other
//! 4xx). Retriable failures back off exponentially and are bounded by a
//! fixed attempt count; exhausting the attempts surfaces as fatal.

use std::time::Duration;

/// Outcome of classifying an HTTP response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 2xx - hand the body to the caller
    Success,
    /// 429 or 5xx - retry with backoff
    Retriable,
    /// Any other status - surface immediately, never retried
    Fatal,
}

/// Classify an HTTP status code
pub fn classify_status(status: u16) -> Classification {
    match status {
        200..=299 => Classification::Success,
        429 => Classification::Retriable,
        500..=599 => Classification::Retriable,
        _ => Classification::Fatal,
    }
}

/// Exponential backoff retry policy
///
/// Delays grow as `base_delay * 2^attempt` with no upper bound below the
/// attempt cap, so every retry waits strictly longer than the previous one.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of tries per request, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt cap and base delay
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to sleep after the given zero-based failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Whether another try is allowed after `attempt` failures
    pub fn should_retry(&self, failed_attempts: u32) -> bool {
        failed_attempts < self.max_attempts
    }
}
