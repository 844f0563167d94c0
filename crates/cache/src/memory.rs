use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{CacheResult, CacheStore, DEFAULT_CAPACITY};

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// Bounded in-process cache. Expired entries are dropped when next touched;
/// once full, the least recently used entry is evicted.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Capacity from a plain count, clamping zero to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    /// Number of entries currently held, including ones that have expired
    /// but not yet been touched.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
        };

        if expired {
            entries.pop(key);
            tracing::trace!(target: "bookstore-cache", cache_key = key, "expired entry dropped");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> CacheResult<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        if let Some((evicted, _)) = self.entries.lock().await.push(key.to_string(), entry) {
            if evicted != key {
                tracing::trace!(target: "bookstore-cache", cache_key = %evicted, "entry evicted");
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().await.pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn entry_lives_until_ttl_elapses() {
        let cache = MemoryCache::default();
        cache.set("book:1", json!({"id": 1}), TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("book:1").await.unwrap(), Some(json!({"id": 1})));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("book:1").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn rewrite_restarts_ttl() {
        let cache = MemoryCache::default();
        cache.set("k", json!(1), TTL).await.unwrap();
        tokio::time::advance(Duration::from_secs(40)).await;
        cache.set("k", json!(2), TTL).await.unwrap();
        tokio::time::advance(Duration::from_secs(40)).await;

        assert_eq!(cache.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryCache::default();
        cache.set("k", json!("v"), TTL).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("missing").await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = MemoryCache::with_capacity(2);
        cache.set("a", json!(1), TTL).await.unwrap();
        cache.set("b", json!(2), TTL).await.unwrap();
        // touch "a" so "b" becomes the eviction candidate
        cache.get("a").await.unwrap();
        cache.set("c", json!(3), TTL).await.unwrap();

        assert_eq!(cache.get("a").await.unwrap(), Some(json!(1)));
        assert_eq!(cache.get("b").await.unwrap(), None);
        assert_eq!(cache.get("c").await.unwrap(), Some(json!(3)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = MemoryCache::with_capacity(0);
        assert_eq!(cache.entries.try_lock().unwrap().cap().get(), 1);
    }
}
