//! Text search over artist and title
//!
//! GET /search?key=no dia em que eu saí de casa&generos=Rock,Samba&pagina=1
//!
//! `generos` is optional; without it every genre is searched.

use axum::{
    extract::{Query, State},
    Json,
};
use ciframe_common::Song;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::engine::{split_csv, text_search};
use crate::pagination::{paginate, parse_page};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub key: Option<String>,
    pub generos: Option<String>,
    pub pagina: Option<String>,
}

/// Reduced song shape (no chord lists)
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id_artista: String,
    pub id_unico_musica: String,
    pub genero: String,
    pub id_musica: String,
    pub nome_artista: String,
    pub nome_musica: String,
    pub url: String,
    pub popularidade: i64,
}

impl From<&Song> for SearchResult {
    fn from(song: &Song) -> Self {
        Self {
            id_artista: song.artist_id.clone(),
            id_unico_musica: song.unique_id.clone(),
            genero: song.genre.clone(),
            id_musica: song.song_id.clone(),
            nome_artista: song.artist.clone(),
            nome_musica: song.title.clone(),
            url: song.url.clone(),
            popularidade: song.popularity,
        }
    }
}

/// GET /search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    let page = parse_page(query.pagina.as_deref()).map_err(ApiError::InvalidPage)?;
    let genres = split_csv(query.generos.as_deref());
    let key = query.key.unwrap_or_default();

    let matches = text_search(&state.catalog, &key, &genres);
    let results = paginate(&matches, page)
        .iter()
        .map(|song| SearchResult::from(*song))
        .collect();
    Ok(Json(results))
}
