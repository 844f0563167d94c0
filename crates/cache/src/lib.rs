//! Cache gateway for read-through lookups.
//!
//! Values are JSON payloads exactly as they were handed back to a caller.
//! Entries expire a fixed duration after they were written.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryCache;

/// Default number of entries kept by [`MemoryCache`].
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cached value for '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with per-entry time-to-live.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<serde_json::Value>>;

    /// Stores `value` under `key`, replacing any previous entry. Last writer wins.
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;
}

pub type CacheStoreArc = Arc<dyn CacheStore>;
