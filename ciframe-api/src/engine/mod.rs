//! Query engine over the immutable catalog
//!
//! - `search`: whole-word, diacritic-insensitive artist/title search
//! - `similarity`: chord-set similarity ranking and famous-sequence lookup
//!
//! Both are synchronous and side-effect free; caching and concurrency
//! limits live in `crate::service`.

pub mod search;
pub mod similarity;

use ciframe_common::{Catalog, Song};

pub use search::text_search;
pub use similarity::{find_similar, Reference, SimilarSong, SimilarityQuery};

/// True if `song` falls inside the genre filter (empty filter = all genres)
///
/// Each song sits in exactly one genre bucket, so membership in the union
/// of the requested buckets reduces to probing each requested bucket.
pub(crate) fn in_genres(catalog: &Catalog, song: &Song, genres: &[String]) -> bool {
    genres.is_empty()
        || genres
            .iter()
            .filter_map(|g| catalog.songs_in_genre(g))
            .any(|bucket| bucket.contains(&song.unique_id))
}

/// Split a comma-separated parameter, dropping blanks and duplicates
pub fn split_csv(raw: Option<&str>) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in raw.unwrap_or_default().split(',').map(str::trim) {
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}
