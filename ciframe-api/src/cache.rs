//! Similarity result cache
//!
//! Entries hold the full ranked list (serialized), keyed by the query
//! signature without the page number, so every page of one query is served
//! from a single entry. The cache is best-effort: callers treat any error as
//! a miss and never surface it.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use thiserror::Error;

/// Entry bound for the in-process cache
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// moka rejects lifetimes beyond 1000 years
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend could not be reached or refused the operation
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Get/set contract of a cache store
///
/// Values are opaque bytes; encoding is the caller's concern. Entry lifetime
/// is a property of the backend.
#[async_trait]
pub trait SimilarityCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;
}

/// In-process TTL cache
///
/// Entries expire `ttl` after insertion. Expired entries and entries beyond
/// `max_entries` are reclaimed by moka's housekeeping, whether or not their
/// key is ever requested again.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, Vec<u8>>,
}

impl MemoryCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl.min(MAX_TTL))
            .build();
        Self { inner }
    }

    /// Live entries, after applying pending evictions
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

#[async_trait]
impl SimilarityCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).await)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), value).await;
        Ok(())
    }
}
