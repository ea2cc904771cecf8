//! Optional bounded retry with exponential backoff.
//!
//! Retry is a policy layered over the transport, not part of the core fetch
//! contract: only transient failures (rate limits, timeouts, HTTP 5xx) are
//! ever re-issued, and only when a policy is configured on the client.

use std::time::Duration;

/// Bounded retry policy: up to `max_attempts` tries per page request, with
/// `base_delay * 2^attempt` between them.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
        }
    }

    pub(crate) fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(3, Duration::from_millis(500))
    }
}
