//! HTTP API handlers for ciframe-api

pub mod error;
pub mod health;
pub mod listing;
pub mod search;
pub mod similar;
pub mod songs;

pub use error::ApiError;
pub use health::health_routes;
pub use listing::{list_chords, list_genres};
pub use search::search;
pub use similar::similar_songs;
pub use songs::{get_song, list_songs};
