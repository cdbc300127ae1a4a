//! Static vocabularies: genre labels and chord identifiers

use axum::{extract::State, Json};

use crate::AppState;

/// GET /generos
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.genres().to_vec())
}

/// GET /acordes
pub async fn list_chords(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.chords().to_vec())
}
