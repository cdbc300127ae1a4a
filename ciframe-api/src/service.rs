//! Similarity search execution: cache in front, concurrency gate around the
//! chord-index scan.
//!
//! Flow per request:
//! 1. Look up the canonical query signature in the cache. A hit that decodes
//!    is returned as is.
//! 2. Otherwise resolve the reference and compute the full ranked list.
//!    Chord-based queries hold a gate permit while ranking.
//! 3. Store the list, best-effort.
//!
//! Steps 2-3 run in a spawned task, so a client disconnecting mid-request
//! does not abort a computation that already started.

use std::sync::Arc;

use ciframe_common::Catalog;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::SimilarityCache;
use crate::engine::similarity::ResolveError;
use crate::engine::{find_similar, Reference, SimilarSong, SimilarityQuery};
use crate::gate::{ConcurrencyGate, GateError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Similarity task failed: {0}")]
    Task(String),
}

#[derive(Clone)]
pub struct SimilarityService {
    catalog: Arc<Catalog>,
    cache: Arc<dyn SimilarityCache>,
    gate: ConcurrencyGate,
}

impl SimilarityService {
    pub fn new(
        catalog: Arc<Catalog>,
        cache: Arc<dyn SimilarityCache>,
        gate: ConcurrencyGate,
    ) -> Self {
        Self {
            catalog,
            cache,
            gate,
        }
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Full ranked list for `query` (pagination is the caller's job)
    pub async fn find(&self, query: &SimilarityQuery) -> Result<Vec<SimilarSong>, ServiceError> {
        let key = query.cache_key();
        if let Some(cached) = self.cached(&key).await {
            return Ok(cached);
        }

        let reference = Reference::resolve(&self.catalog, query)?;
        let service = self.clone();
        let genres = query.genres.clone();

        tokio::spawn(async move { service.compute_and_store(key, reference, genres).await })
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
    }

    async fn cached(&self, key: &str) -> Option<Vec<SimilarSong>> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(ranked) => {
                    debug!(key, "Similarity cache hit");
                    Some(ranked)
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "Similarity cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Cache lookup failed, recomputing");
                None
            }
        }
    }

    async fn compute_and_store(
        &self,
        key: String,
        reference: Reference,
        genres: Vec<String>,
    ) -> Result<Vec<SimilarSong>, ServiceError> {
        let ranked = if reference.is_chord_based() {
            let _permit = self.gate.acquire().await?;
            let catalog = Arc::clone(&self.catalog);
            tokio::task::spawn_blocking(move || find_similar(&catalog, &reference, &genres))
                .await
                .map_err(|e| ServiceError::Task(e.to_string()))?
        } else {
            find_similar(&self.catalog, &reference, &genres)
        };

        self.store(&key, &ranked).await;
        Ok(ranked)
    }

    async fn store(&self, key: &str, ranked: &[SimilarSong]) {
        let bytes = match serde_json::to_vec(ranked) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Could not encode similarity result for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, bytes).await {
            warn!(key, error = %e, "Cache store failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MemoryCache, DEFAULT_MAX_ENTRIES};
    use crate::engine::fixtures::abc;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Backend that fails every call
    struct BrokenCache {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SimilarityCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    fn service_with(cache: Arc<dyn SimilarityCache>) -> SimilarityService {
        SimilarityService::new(Arc::new(abc()), cache, ConcurrencyGate::new(2, None))
    }

    fn memory_cache() -> Arc<MemoryCache> {
        Arc::new(MemoryCache::new(DEFAULT_MAX_ENTRIES, Duration::from_secs(60)))
    }

    fn by_song(id: &str) -> SimilarityQuery {
        SimilarityQuery {
            song_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_miss_computes_and_stores() {
        let cache = memory_cache();
        let service = service_with(cache.clone());

        let ranked = service.find(&by_song("a_a")).await.unwrap();
        let ids: Vec<&str> = ranked.iter().map(|r| r.id_unico_musica.as_str()).collect();
        assert_eq!(ids, vec!["b_b", "c_c"]);
        assert_eq!(cache.entry_count().await, 1);
        assert_eq!(service.gate().available(), 2);
    }

    #[tokio::test]
    async fn test_hit_matches_fresh_computation() {
        let cache = memory_cache();
        let service = service_with(cache.clone());

        let fresh = service.find(&by_song("a_a")).await.unwrap();
        let cached = service.find(&by_song("a_a")).await.unwrap();
        assert_eq!(fresh, cached);
    }

    #[tokio::test]
    async fn test_hit_skips_recomputation() {
        let cache = memory_cache();
        let service = service_with(cache.clone());
        let query = by_song("a_a");

        let planted = vec![SimilarSong {
            id_unico_musica: "planted".to_string(),
            id_artista: String::new(),
            id_musica: String::new(),
            nome_artista: String::new(),
            nome_musica: String::new(),
            popularidade: 0,
            acordes: Vec::new(),
            genero: String::new(),
            url: String::new(),
            diferenca: None,
            intersecao: None,
        }];
        cache
            .set(&query.cache_key(), serde_json::to_vec(&planted).unwrap())
            .await
            .unwrap();

        assert_eq!(service.find(&query).await.unwrap(), planted);
    }

    #[tokio::test]
    async fn test_corrupt_entry_recomputed_and_replaced() {
        let cache = memory_cache();
        let service = service_with(cache.clone());
        let query = by_song("a_a");
        cache
            .set(&query.cache_key(), b"{not json".to_vec())
            .await
            .unwrap();

        let ranked = service.find(&query).await.unwrap();
        assert_eq!(ranked.len(), 2);

        let stored = cache.get(&query.cache_key()).await.unwrap().unwrap();
        let decoded: Vec<SimilarSong> = serde_json::from_slice(&stored).unwrap();
        assert_eq!(decoded, ranked);
    }

    #[tokio::test]
    async fn test_backend_failure_is_silent() {
        let broken = Arc::new(BrokenCache {
            calls: AtomicUsize::new(0),
        });
        let service = service_with(broken.clone());

        let ranked = service.find(&by_song("a_a")).await.unwrap();
        assert_eq!(ranked.len(), 2);
        // one get, one set, no retries
        assert_eq!(broken.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_song_not_cached() {
        let cache = memory_cache();
        let service = service_with(cache.clone());

        let err = service.find(&by_song("missing")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Resolve(ResolveError::UnknownSong(_))));
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_gate_timeout_surfaces() {
        let service = SimilarityService::new(
            Arc::new(abc()),
            memory_cache(),
            ConcurrencyGate::new(1, Some(Duration::from_millis(20))),
        );
        let _held = service.gate().acquire().await.unwrap();

        let err = service.find(&by_song("a_a")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Gate(GateError::Timeout(_))));

        // Sequence lookups do not need a slot
        let by_sequence = SimilarityQuery {
            sequence: Some("CGAmF".to_string()),
            ..Default::default()
        };
        assert_eq!(service.find(&by_sequence).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_distinct_queries_do_not_accumulate_after_expiry() {
        let cache = Arc::new(MemoryCache::new(DEFAULT_MAX_ENTRIES, Duration::from_millis(1)));
        let service = service_with(cache.clone());

        for i in 0..200 {
            let query = SimilarityQuery {
                chords: vec![format!("X{i}")],
                ..Default::default()
            };
            service.find(&query).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        let last = SimilarityQuery {
            chords: vec!["C".to_string()],
            ..Default::default()
        };
        assert_eq!(service.find(&last).await.unwrap().len(), 3);
        assert!(cache.entry_count().await <= 1);
    }
}
