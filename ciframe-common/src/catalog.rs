//! Immutable song catalog and its inverted indices
//!
//! Built exactly once at startup from parsed rows, then shared read-only
//! (behind `Arc`) by every request handler.
//!
//! - `corpus`: all songs, popularity descending, ties in load order
//! - chord index: chord token -> ids of songs using it
//! - genre index: genre label -> ids of songs in it

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::model::{Song, SongRow};
use crate::sequences::SequenceRegistry;
use crate::{Error, Result};

pub type SongIdSet = HashSet<String>;

#[derive(Debug)]
pub struct Catalog {
    corpus: Vec<Song>,
    /// unique id -> position in `corpus`
    ranks: HashMap<String, usize>,
    chord_index: HashMap<String, SongIdSet>,
    genre_index: HashMap<String, SongIdSet>,
    genres: Vec<String>,
    chords: Vec<String>,
    sequences: SequenceRegistry,
}

impl Catalog {
    /// Build the catalog from parsed rows
    ///
    /// A duplicate unique id fails the whole build.
    pub fn build<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = SongRow>,
    {
        let mut corpus = Vec::new();
        let mut seen = HashSet::new();
        let mut chord_index: HashMap<String, SongIdSet> = HashMap::new();
        let mut genre_index: HashMap<String, SongIdSet> = HashMap::new();

        for row in rows {
            let song = Song::from_row(row);
            if !seen.insert(song.unique_id.clone()) {
                return Err(Error::DuplicateSong(song.unique_id));
            }

            for chord in &song.chords {
                chord_index
                    .entry(chord.clone())
                    .or_default()
                    .insert(song.unique_id.clone());
            }
            genre_index
                .entry(song.genre.clone())
                .or_default()
                .insert(song.unique_id.clone());

            corpus.push(song);
        }

        // Vec::sort_by is stable: equal popularity keeps load order
        corpus.sort_by(|a, b| b.popularity.cmp(&a.popularity));

        let ranks = corpus
            .iter()
            .enumerate()
            .map(|(rank, song)| (song.unique_id.clone(), rank))
            .collect();

        let mut genres: Vec<String> = genre_index.keys().cloned().collect();
        genres.sort();
        let mut chords: Vec<String> = chord_index.keys().cloned().collect();
        chords.sort();

        info!(
            songs = corpus.len(),
            genres = genres.len(),
            chords = chords.len(),
            "Catalog built"
        );

        Ok(Self {
            corpus,
            ranks,
            chord_index,
            genre_index,
            genres,
            chords,
            sequences: SequenceRegistry::new(),
        })
    }

    /// All songs in canonical (popularity) order
    pub fn corpus(&self) -> &[Song] {
        &self.corpus
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn get(&self, unique_id: &str) -> Option<&Song> {
        self.rank_of(unique_id).map(|rank| &self.corpus[rank])
    }

    /// Position of a song in the canonical order
    pub fn rank_of(&self, unique_id: &str) -> Option<usize> {
        self.ranks.get(unique_id).copied()
    }

    pub fn song_at(&self, rank: usize) -> Option<&Song> {
        self.corpus.get(rank)
    }

    pub fn songs_with_chord(&self, chord: &str) -> Option<&SongIdSet> {
        self.chord_index.get(chord)
    }

    pub fn songs_in_genre(&self, genre: &str) -> Option<&SongIdSet> {
        self.genre_index.get(genre)
    }

    /// Sorted genre labels
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Sorted chord identifiers present in the corpus
    pub fn chords(&self) -> &[String] {
        &self.chords
    }

    pub fn sequences(&self) -> &SequenceRegistry {
        &self.sequences
    }
}
