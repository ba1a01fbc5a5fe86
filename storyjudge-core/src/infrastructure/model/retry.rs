//! Bounded retry with a fixed backoff interval.

use crate::constants::{DEFAULT_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS};
use std::time::Duration;

/// How many times a `generate` call may hit the provider and how long it
/// waits between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; always at least 1
    pub max_attempts: u32,
    /// Fixed wait before every retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Wait before attempt `attempt + 1`. Fixed for every attempt.
    pub fn delay_after(&self, _attempt: u32) -> Duration {
        self.backoff
    }
}
