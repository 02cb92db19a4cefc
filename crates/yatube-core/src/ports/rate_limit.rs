//! Throttling of abuse-prone form submissions (login, signup).

use async_trait::async_trait;
use std::time::Duration;

/// Counts requests per key (a client address) inside a rolling window.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` and report whether it may proceed.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Outcome of one [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Time until the next request for the key would be let through. Zero
    /// when `allowed`.
    pub reset_after: Duration,
}

impl RateLimitResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reset_after: Duration::ZERO,
        }
    }

    pub fn denied(reset_after: Duration) -> Self {
        Self {
            allowed: false,
            reset_after,
        }
    }

    /// Whole seconds for a `Retry-After` header, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_after.as_secs_f64().ceil().max(1.0) as u64
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter backend failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(RateLimitResult::denied(Duration::from_millis(1500)).retry_after_secs(), 2);
        assert_eq!(RateLimitResult::denied(Duration::from_secs(3)).retry_after_secs(), 3);
        assert_eq!(RateLimitResult::denied(Duration::ZERO).retry_after_secs(), 1);
    }
}
