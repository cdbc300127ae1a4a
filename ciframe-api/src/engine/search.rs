//! Artist/title text search

use ciframe_common::text::tokenize;
use ciframe_common::{Catalog, Song};

use super::in_genres;

/// Songs whose artist + title contain every word of `key`
///
/// Matching is on whole folded words (lowercase, diacritics stripped).
/// Results keep corpus popularity order. A key with no words matches
/// nothing.
pub fn text_search<'a>(catalog: &'a Catalog, key: &str, genres: &[String]) -> Vec<&'a Song> {
    let tokens = tokenize(key);
    if tokens.is_empty() {
        return Vec::new();
    }

    catalog
        .corpus()
        .iter()
        .filter(|song| in_genres(catalog, song, genres))
        .filter(|song| song.matches_all_tokens(&tokens))
        .collect()
}
