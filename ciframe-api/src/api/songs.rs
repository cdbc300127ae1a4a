//! Corpus browsing
//!
//! GET /musicas?pagina=N  - page of the full corpus, most popular first
//! GET /musica/:id        - one song by unique id

use axum::{
    extract::{Path, Query, State},
    Json,
};
use ciframe_common::model::SongDto;
use serde::Deserialize;

use super::ApiError;
use crate::pagination::{paginate, parse_page};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub pagina: Option<String>,
}

/// GET /musicas
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<SongDto>>, ApiError> {
    let page = parse_page(query.pagina.as_deref()).map_err(ApiError::InvalidPage)?;
    let songs = paginate(state.catalog.corpus(), page)
        .iter()
        .map(SongDto::from)
        .collect();
    Ok(Json(songs))
}

/// GET /musica/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongDto>, ApiError> {
    state
        .catalog
        .get(&id)
        .map(|song| Json(SongDto::from(song)))
        .ok_or(ApiError::NotFound(id))
}
