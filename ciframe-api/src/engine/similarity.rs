//! Chord-set similarity ranking
//!
//! A query names its reference chords one of three ways, checked in this
//! order:
//! 1. `sequence`: a famous-progression code. Known codes select the songs
//!    tagged with that progression, ranked by popularity only. Unknown
//!    codes fall through.
//! 2. `chords`: an explicit chord list.
//! 3. `song_id`: the chords of an existing song. That song, and songs with
//!    fewer than two distinct chords, are left out of the results.
//!
//! Chord-based results are the union of the chord-index buckets for the
//! reference chords, optionally intersected with the genre filter, ranked by
//! ascending |candidate − reference|, then popularity descending, then
//! corpus order.

use std::collections::HashSet;

use ciframe_common::{Catalog, Song};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::in_genres;

/// Similarity query as received from the client (minus the page number)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityQuery {
    pub sequence: Option<String>,
    pub chords: Vec<String>,
    pub song_id: Option<String>,
    pub genres: Vec<String>,
}

impl SimilarityQuery {
    /// Canonical signature of every parameter that affects the ranking
    ///
    /// Chords and genres are sets, so they are sorted; the page number is
    /// deliberately absent so all pages share one cached list.
    pub fn cache_key(&self) -> String {
        let sorted = |values: &[String]| {
            let mut values = values.to_vec();
            values.sort();
            values.join(",")
        };
        format!(
            "similares|sequencia={}|acordes={}|id_unico_musica={}|generos={}",
            self.sequence.as_deref().unwrap_or_default(),
            sorted(&self.chords),
            self.song_id.as_deref().unwrap_or_default(),
            sorted(&self.genres),
        )
    }
}

/// Reference that candidates are compared against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Famous-sequence id from the registry
    Sequence(u8),
    /// Explicit chord list
    Chords(HashSet<String>),
    /// Chords taken from a catalog song, which is excluded from results
    Song {
        unique_id: String,
        chords: HashSet<String>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown song id: {0}")]
    UnknownSong(String),
}

impl Reference {
    /// Pick the reference for `query` (see module docs for precedence)
    ///
    /// With no usable parameter the reference is an empty chord set, which
    /// matches nothing.
    pub fn resolve(catalog: &Catalog, query: &SimilarityQuery) -> Result<Self, ResolveError> {
        if let Some(id) = query
            .sequence
            .as_deref()
            .and_then(|code| catalog.sequences().lookup(code))
        {
            return Ok(Reference::Sequence(id));
        }

        if !query.chords.is_empty() {
            return Ok(Reference::Chords(query.chords.iter().cloned().collect()));
        }

        match query.song_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => {
                let song = catalog
                    .get(id)
                    .ok_or_else(|| ResolveError::UnknownSong(id.to_string()))?;
                Ok(Reference::Song {
                    unique_id: song.unique_id.clone(),
                    chords: song.chord_set().clone(),
                })
            }
            None => Ok(Reference::Chords(HashSet::new())),
        }
    }

    /// Chord-based references scan the chord index; sequence lookups do not
    pub fn is_chord_based(&self) -> bool {
        !matches!(self, Reference::Sequence(_))
    }
}

/// Ranked similarity result, also the cached record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarSong {
    pub id_unico_musica: String,
    pub id_artista: String,
    pub id_musica: String,
    pub nome_artista: String,
    pub nome_musica: String,
    pub popularidade: i64,
    pub acordes: Vec<String>,
    pub genero: String,
    pub url: String,
    /// Candidate chords missing from the reference (absent for sequence matches)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diferenca: Option<Vec<String>>,
    /// Candidate chords shared with the reference (absent for sequence matches)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersecao: Option<Vec<String>>,
}

impl SimilarSong {
    fn from_song(song: &Song) -> Self {
        Self {
            id_unico_musica: song.unique_id.clone(),
            id_artista: song.artist_id.clone(),
            id_musica: song.song_id.clone(),
            nome_artista: song.artist.clone(),
            nome_musica: song.title.clone(),
            popularidade: song.popularity,
            acordes: song.chords.clone(),
            genero: song.genre.clone(),
            url: song.url.clone(),
            diferenca: None,
            intersecao: None,
        }
    }

    fn compared(song: &Song, reference: &HashSet<String>) -> Self {
        Self {
            diferenca: Some(song.difference(reference)),
            intersecao: Some(song.intersection(reference)),
            ..Self::from_song(song)
        }
    }

    pub fn difference_len(&self) -> usize {
        self.diferenca.as_ref().map_or(0, Vec::len)
    }
}

/// Full ranked (unpaginated) result for `reference`
pub fn find_similar(catalog: &Catalog, reference: &Reference, genres: &[String]) -> Vec<SimilarSong> {
    match reference {
        Reference::Sequence(id) => by_sequence(catalog, *id, genres),
        Reference::Chords(chords) => by_chords(catalog, chords, None, genres),
        Reference::Song { unique_id, chords } => {
            by_chords(catalog, chords, Some(unique_id.as_str()), genres)
        }
    }
}

fn by_sequence(catalog: &Catalog, sequence_id: u8, genres: &[String]) -> Vec<SimilarSong> {
    catalog
        .corpus()
        .iter()
        .filter(|song| in_genres(catalog, song, genres))
        .filter(|song| song.matches_sequence(sequence_id))
        .map(SimilarSong::from_song)
        .collect()
}

fn by_chords(
    catalog: &Catalog,
    reference: &HashSet<String>,
    exclude: Option<&str>,
    genres: &[String],
) -> Vec<SimilarSong> {
    // Union of the buckets of every reference chord
    let mut candidates: HashSet<&str> = HashSet::new();
    for chord in reference {
        if let Some(ids) = catalog.songs_with_chord(chord) {
            candidates.extend(ids.iter().map(String::as_str));
        }
    }

    let mut ranked: Vec<(usize, SimilarSong)> = candidates
        .into_iter()
        .filter_map(|id| catalog.rank_of(id))
        .filter_map(|rank| catalog.song_at(rank).map(|song| (rank, song)))
        .filter(|(_, song)| in_genres(catalog, song, genres))
        .filter(|(_, song)| match exclude {
            Some(source) => song.unique_id != source && song.chord_count() > 1,
            None => true,
        })
        .map(|(rank, song)| (rank, SimilarSong::compared(song, reference)))
        .collect();

    // Corpus rank already encodes popularity descending with a stable tie-break
    ranked.sort_by_key(|(rank, similar)| (similar.difference_len(), *rank));
    ranked.into_iter().map(|(_, similar)| similar).collect()
}
