//! Redis page cache, shared by every web worker pointed at the same server.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use yatube_core::ports::{Cache, CacheError};

/// Where the page cache lives and how its keys are namespaced.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub connect_timeout: Duration,
    /// Prepended to every key so several sites can share one server.
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "yatube:".to_string(),
        }
    }
}

impl RedisConfig {
    /// `REDIS_URL`, `REDIS_CONNECT_TIMEOUT_SECS` and `REDIS_KEY_PREFIX`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }
}

/// Redis-backed page cache. The connection manager reconnects on its own.
pub struct RedisCache {
    conn: ConnectionManager,
    key_prefix: String,
}

fn op_error(e: redis::RedisError) -> CacheError {
    CacheError::Operation(e.to_string())
}

impl RedisCache {
    pub async fn new(config: &RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        // Don't hang startup on an unreachable server
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, prefix = %config.key_prefix, "Connected to Redis page cache");

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

/// Escape glob metacharacters so a prefix matches literally in SCAN MATCH.
fn glob_escape(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('*');
    escaped
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.full_key(key))
            .await
            .unwrap_or_else(|e| {
                // A broken cache degrades to rendering every page
                tracing::warn!(key, error = %e, "Redis GET failed");
                None
            })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.full_key(key);

        match ttl {
            // Millisecond precision; a sub-second TTL must not become "forever"
            Some(ttl) => conn
                .pset_ex::<_, _, ()>(key, value, ttl.as_millis().max(1) as u64)
                .await
                .map_err(op_error),
            None => conn.set::<_, _, ()>(key, value).await.map_err(op_error),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.full_key(key)).await.map_err(op_error)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let pattern = glob_escape(&self.full_key(prefix));
        let mut scan_conn = self.conn.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = scan_conn
                .scan_match::<_, String>(pattern)
                .await
                .map_err(op_error)?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&keys).await.map_err(op_error)?;
        tracing::debug!(prefix, count = keys.len(), "Invalidated cached pages");
        Ok(())
    }
}
