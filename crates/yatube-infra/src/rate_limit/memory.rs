//! In-memory rate limiter using governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};

use yatube_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Forget idle clients once this many keys are tracked.
const RETAIN_THRESHOLD: usize = 10_000;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("AUTH_RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var("AUTH_RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }
}

/// Per-key GCRA limiter. Each key (a client address) gets its own bucket.
///
/// Limits are per-process, not shared across instances.
pub struct InMemoryRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(config.window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        if self.limiter.len() > RETAIN_THRESHOLD {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(_) => Ok(RateLimitResult::allowed()),
            Err(not_until) => Ok(RateLimitResult::denied(
                not_until.wait_time_from(self.clock.now()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn test_allows_burst_then_blocks() {
        let limiter = limiter(3);

        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        }

        let blocked = limiter.check("10.0.0.1").await.unwrap();
        assert!(!blocked.allowed);
        assert!(blocked.reset_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1);

        assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(!limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(limiter.check("10.0.0.2").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_zero_requests_is_clamped() {
        let limiter = limiter(0);
        assert!(limiter.check("k").await.unwrap().allowed);
    }
}
