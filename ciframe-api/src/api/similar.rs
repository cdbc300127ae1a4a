//! Similarity search
//!
//! GET /similares?acordes=C,G,Am&generos=Rock&pagina=1
//! GET /similares?id_unico_musica=legiao-urbana_tempo-perdido
//! GET /similares?sequencia=C,G,Am,F
//!
//! The full ranked list comes from `SimilarityService` (cached per query
//! signature); only the requested page is returned.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use super::ApiError;
use crate::engine::{split_csv, SimilarSong, SimilarityQuery};
use crate::pagination::{paginate, parse_page};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub acordes: Option<String>,
    pub id_unico_musica: Option<String>,
    pub sequencia: Option<String>,
    pub generos: Option<String>,
    pub pagina: Option<String>,
}

impl SimilarParams {
    fn to_query(&self) -> SimilarityQuery {
        SimilarityQuery {
            sequence: self.sequencia.clone().filter(|s| !s.is_empty()),
            chords: split_csv(self.acordes.as_deref()),
            song_id: self.id_unico_musica.clone().filter(|s| !s.is_empty()),
            genres: split_csv(self.generos.as_deref()),
        }
    }
}

/// GET /similares
pub async fn similar_songs(
    State(state): State<AppState>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<Vec<SimilarSong>>, ApiError> {
    let page = parse_page(params.pagina.as_deref()).map_err(ApiError::InvalidPage)?;
    let query = params.to_query();

    let ranked = state.similarity.find(&query).await?;
    debug!(total = ranked.len(), page, "Similarity results ranked");

    Ok(Json(paginate(&ranked, page).to_vec()))
}
