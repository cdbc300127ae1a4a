//! Song model
//!
//! A `SongRow` is what the corpus loader hands over: fields already split,
//! chord field split into raw tokens. A `Song` is the normalized, immutable
//! record that the catalog indexes.

use std::collections::HashSet;

use serde::Serialize;

use crate::chords::normalize_chords;
use crate::text::tokenize;

/// Base URL of the chart site songs link to
pub const CHART_BASE_URL: &str = "http://www.cifraclub.com.br";

/// Parsed corpus row, prior to chord normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRow {
    pub artist_id: String,
    pub song_id: String,
    pub artist: String,
    pub title: String,
    pub genre: String,
    pub popularity: i64,
    pub key: String,
    pub famous_sequences: Vec<String>,
    /// Raw chord tokens (may contain tablature fragments)
    pub raw_chords: Vec<String>,
}

/// Immutable song record
///
/// `chords` keeps first-occurrence order for stable JSON output;
/// `chord_set` backs the set algebra. `search_tokens` holds the folded
/// artist + title words used by text search.
#[derive(Debug, Clone)]
pub struct Song {
    pub unique_id: String,
    pub artist_id: String,
    pub song_id: String,
    pub artist: String,
    pub title: String,
    pub genre: String,
    pub popularity: i64,
    pub key: String,
    pub famous_sequences: Vec<String>,
    pub chords: Vec<String>,
    chord_set: HashSet<String>,
    search_tokens: HashSet<String>,
    pub url: String,
}

impl Song {
    /// Build a song from a parsed row, normalizing its chord tokens
    pub fn from_row(row: SongRow) -> Self {
        let chords = normalize_chords(&row.raw_chords);
        let chord_set = chords.iter().cloned().collect();
        let search_tokens = tokenize(&format!("{} {}", row.artist, row.title))
            .into_iter()
            .collect();
        Self {
            unique_id: unique_id(&row.artist_id, &row.song_id),
            url: chart_url(&row.artist_id, &row.song_id),
            artist_id: row.artist_id,
            song_id: row.song_id,
            artist: row.artist,
            title: row.title,
            genre: row.genre,
            popularity: row.popularity,
            key: row.key,
            famous_sequences: row.famous_sequences,
            chords,
            chord_set,
            search_tokens,
        }
    }

    pub fn chord_set(&self) -> &HashSet<String> {
        &self.chord_set
    }

    /// Number of distinct chords in the chart
    pub fn chord_count(&self) -> usize {
        self.chord_set.len()
    }

    /// True if every (already folded) token is a whole word of artist + title
    pub fn matches_all_tokens(&self, tokens: &[String]) -> bool {
        tokens.iter().all(|t| self.search_tokens.contains(t))
    }

    pub fn matches_sequence(&self, sequence_id: u8) -> bool {
        let wanted = sequence_id.to_string();
        self.famous_sequences.iter().any(|s| *s == wanted)
    }

    /// Chords of this song that are also in `reference`, in chart order
    pub fn intersection(&self, reference: &HashSet<String>) -> Vec<String> {
        self.chords
            .iter()
            .filter(|c| reference.contains(*c))
            .cloned()
            .collect()
    }

    /// Chords of this song missing from `reference`, in chart order
    pub fn difference(&self, reference: &HashSet<String>) -> Vec<String> {
        self.chords
            .iter()
            .filter(|c| !reference.contains(*c))
            .cloned()
            .collect()
    }
}

/// Full song representation served by `/musicas` and `/musica/:id`
#[derive(Debug, Clone, Serialize)]
pub struct SongDto {
    pub id_unico_musica: String,
    pub id_artista: String,
    pub id_musica: String,
    pub artista: String,
    pub nome: String,
    pub genero: String,
    pub popularidade: i64,
    pub tom: String,
    pub cifra: Vec<String>,
    pub seq_famosas: Vec<String>,
    pub url: String,
}

impl From<&Song> for SongDto {
    fn from(song: &Song) -> Self {
        Self {
            id_unico_musica: song.unique_id.clone(),
            id_artista: song.artist_id.clone(),
            id_musica: song.song_id.clone(),
            artista: song.artist.clone(),
            nome: song.title.clone(),
            genero: song.genre.clone(),
            popularidade: song.popularity,
            tom: song.key.clone(),
            cifra: song.chords.clone(),
            seq_famosas: song.famous_sequences.clone(),
            url: song.url.clone(),
        }
    }
}

pub fn unique_id(artist_id: &str, song_id: &str) -> String {
    format!("{}_{}", artist_id, song_id)
}

pub fn chart_url(artist_id: &str, song_id: &str) -> String {
    format!("{}/{}/{}", CHART_BASE_URL, artist_id, song_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> SongRow {
        SongRow {
            artist_id: "legiao-urbana".to_string(),
            song_id: "tempo-perdido".to_string(),
            artist: "Legião Urbana".to_string(),
            title: "Tempo Perdido".to_string(),
            genre: "Rock".to_string(),
            popularity: 1200,
            key: "C".to_string(),
            famous_sequences: vec!["1".to_string()],
            raw_chords: vec!["C  G".to_string(), "Am".to_string(), "F".to_string(), "C".to_string()],
        }
    }

    #[test]
    fn test_song_identity_and_url() {
        let song = Song::from_row(row());
        assert_eq!(song.unique_id, "legiao-urbana_tempo-perdido");
        assert_eq!(
            song.url,
            "http://www.cifraclub.com.br/legiao-urbana/tempo-perdido"
        );
    }

    #[test]
    fn test_song_chords_deduplicated_in_order() {
        let song = Song::from_row(row());
        assert_eq!(song.chords, vec!["C", "G", "Am", "F"]);
        assert_eq!(song.chord_count(), 4);
        assert!(song.chord_set().contains("Am"));
        assert!(!song.chord_set().contains("am"));
    }

    #[test]
    fn test_difference_and_intersection() {
        let song = Song::from_row(row());
        let reference: HashSet<String> = ["C", "G", "D"].iter().map(|s| s.to_string()).collect();

        assert_eq!(song.intersection(&reference), vec!["C", "G"]);
        assert_eq!(song.difference(&reference), vec!["Am", "F"]);
    }

    #[test]
    fn test_matches_all_tokens_whole_words() {
        let song = Song::from_row(row());
        let tokens = |s: &[&str]| s.iter().map(|t| t.to_string()).collect::<Vec<_>>();

        assert!(song.matches_all_tokens(&tokens(&["legiao", "perdido"])));
        assert!(!song.matches_all_tokens(&tokens(&["legi"])));
        assert!(!song.matches_all_tokens(&tokens(&["tempo", "casa"])));
    }

    #[test]
    fn test_matches_sequence() {
        let song = Song::from_row(row());
        assert!(song.matches_sequence(1));
        assert!(!song.matches_sequence(0));
    }

    #[test]
    fn test_dto_field_mapping() {
        let song = Song::from_row(row());
        let json = serde_json::to_value(SongDto::from(&song)).unwrap();
        assert_eq!(json["id_unico_musica"], "legiao-urbana_tempo-perdido");
        assert_eq!(json["nome"], "Tempo Perdido");
        assert_eq!(json["popularidade"], 1200);
        assert_eq!(json["cifra"][2], "Am");
    }
}
