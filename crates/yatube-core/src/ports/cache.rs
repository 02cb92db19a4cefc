use async_trait::async_trait;
use std::time::Duration;

/// Prefix of every cached index page key.
pub const INDEX_CACHE_PREFIX: &str = "index_page:";

/// Cache trait - abstraction over caching backends (Redis, in-memory).
///
/// Used for rendered pages, so values are plain strings.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache. Expired entries read as missing.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value in the cache with optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every key starting with `prefix`.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
