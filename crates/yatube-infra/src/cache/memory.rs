//! In-memory page cache, used when Redis is not configured or unreachable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::ports::{Cache, CacheError};

/// Default bound on stored pages.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// In-memory page cache using a HashMap behind an async RwLock.
///
/// Per-process only: entries are lost on restart and are not shared
/// between workers of different processes. When full, expired entries
/// are swept; if that frees nothing, new keys are not stored.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            max_entries,
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired() {
            drop(store);
            let mut store = self.store.write().await;
            // Another writer may have refreshed the key in between.
            if store.get(key).is_some_and(CacheEntry::is_expired) {
                store.remove(key);
            }
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;

        if store.len() >= self.max_entries && !store.contains_key(key) {
            store.retain(|_, entry| !entry.is_expired());
            if store.len() >= self.max_entries {
                tracing::debug!(key, "Page cache full, not storing");
                return Ok(());
            }
        }

        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        cache.delete("key1").await.unwrap();
        assert_eq!(cache.get("key1").await, None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("page", "<html>", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(cache.get("page").await.as_deref(), Some("<html>"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("page").await, None);
    }

    #[tokio::test]
    async fn test_full_cache_sweeps_expired_entries() {
        let cache = InMemoryCache::with_capacity(2);
        cache
            .set("old", "a", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("kept", "b", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        cache.set("new", "c", None).await.unwrap();
        assert_eq!(cache.get("new").await.as_deref(), Some("c"));
        assert_eq!(cache.get("kept").await.as_deref(), Some("b"));

        // Full of live entries: new keys are dropped, existing ones update.
        cache.set("extra", "d", None).await.unwrap();
        assert_eq!(cache.get("extra").await, None);
        cache.set("kept", "b2", None).await.unwrap();
        assert_eq!(cache.get("kept").await.as_deref(), Some("b2"));
    }

    #[tokio::test]
    async fn test_delete_prefix_keeps_other_keys() {
        let cache = InMemoryCache::new();
        cache.set("index_page:anon:1", "a", None).await.unwrap();
        cache.set("index_page:7:2", "b", None).await.unwrap();
        cache.set("other", "c", None).await.unwrap();

        cache.delete_prefix("index_page:").await.unwrap();

        assert_eq!(cache.get("index_page:anon:1").await, None);
        assert_eq!(cache.get("index_page:7:2").await, None);
        assert_eq!(cache.get("other").await.as_deref(), Some("c"));
    }
}
