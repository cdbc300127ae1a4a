//! # Ciframe Common Library
//!
//! Shared code for the Ciframe catalog service including:
//! - Song model and chord normalization
//! - Corpus file loading
//! - Immutable catalog indices (by chord, by genre)
//! - Famous-sequence registry
//! - Diacritic-insensitive text folding
//! - Bootstrap configuration loading

pub mod catalog;
pub mod chords;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod sequences;
pub mod text;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use model::{Song, SongRow};
