//! Retry policy.
//!
//! # Responsibilities
//! - Bound the number of upstream attempts per request
//! - Classify upstream statuses as retryable (>= 300)
//! - Optionally exclude already-tried backends from re-selection
//! - Optionally delay between attempts
//!
//! The policy is a plain value handed to each dispatch call.

use std::time::Duration;

use axum::http::StatusCode;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    exclude_tried: bool,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    /// A policy with `max_attempts` (clamped to at least 1), no exclusion and no backoff.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            exclude_tried: false,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Skip backends that already failed this request while others remain.
    pub fn excluding_tried(mut self, exclude: bool) -> Self {
        self.exclude_tried = exclude;
        self
    }

    /// Exponential backoff between attempts; a zero base disables it.
    pub fn with_backoff(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self.max_delay_ms = max_delay_ms.max(base_delay_ms);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn excludes_tried(&self) -> bool {
        self.exclude_tried
    }

    /// Any response with status >= 300 is worth another attempt.
    pub fn is_retryable(status: StatusCode) -> bool {
        status.as_u16() >= 300
    }

    /// Whether a response received on `attempt` (1-based) should be retried.
    pub fn should_retry(&self, attempt: u32, status: StatusCode) -> bool {
        Self::is_retryable(status) && attempt < self.max_attempts
    }

    /// Delay before the attempt following `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts)
            .excluding_tried(config.exclude_tried)
            .with_backoff(config.base_delay_ms, config.max_delay_ms)
    }
}
