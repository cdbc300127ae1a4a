//! ciframe-api library - chord-similarity song catalog service
//!
//! Read-only JSON API over an in-memory song corpus: browsing, text search
//! and chord-set similarity search.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::Router;
use ciframe_common::Catalog;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cache;
pub mod engine;
pub mod gate;
pub mod logging;
pub mod pagination;
pub mod service;

use cache::{MemoryCache, SimilarityCache, DEFAULT_MAX_ENTRIES};
use gate::ConcurrencyGate;
use service::SimilarityService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Immutable corpus and indices
    pub catalog: Arc<Catalog>,
    /// Cached, concurrency-limited similarity search
    pub similarity: SimilarityService,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, similarity: SimilarityService) -> Self {
        Self {
            catalog,
            similarity,
        }
    }

    /// State backed by the in-process cache
    pub fn with_memory_cache(
        catalog: Catalog,
        max_concurrent: usize,
        acquire_timeout: Option<Duration>,
        cache_ttl: Duration,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let cache: Arc<dyn SimilarityCache> =
            Arc::new(MemoryCache::new(DEFAULT_MAX_ENTRIES, cache_ttl));
        let gate = ConcurrencyGate::new(max_concurrent, acquire_timeout);
        let similarity = SimilarityService::new(Arc::clone(&catalog), cache, gate);
        Self::new(catalog, similarity)
    }
}

/// Build application router
///
/// Every route is GET-only and answers CORS preflights for any origin.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/musicas", get(api::list_songs))
        .route("/musica/:id", get(api::get_song))
        .route("/generos", get(api::list_genres))
        .route("/acordes", get(api::list_chords))
        .route("/search", get(api::search))
        .route("/similares", get(api::similar_songs))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
