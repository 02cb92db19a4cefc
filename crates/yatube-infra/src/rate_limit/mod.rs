//! Request throttling for the sign-up and login forms.

mod memory;

pub use memory::{InMemoryRateLimiter, RateLimitConfig};
