//! Chord token normalization
//!
//! Raw chart fields mix plain chord lists ("C  G Am") with tablature lines
//! ("E|--0--3--|"). Normalization yields exact-match, case-sensitive chord
//! identifiers with duplicates removed (first occurrence wins).
//!
//! Normalized tokens contain neither whitespace nor the bar marker, so
//! normalizing an already-normalized list returns it unchanged.

use std::collections::HashSet;

/// Tablature bar marker
pub const TAB_BAR: char = '|';

/// Normalize a list of raw chord tokens
pub fn normalize_chords<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut chords = Vec::new();

    for token in raw {
        let token = token.as_ref().trim();
        if token.is_empty() {
            continue;
        }

        if let Some((before_bar, _)) = token.split_once(TAB_BAR) {
            // Tablature: keep the chord name heading the line, if any
            if let Some(chord) = before_bar.split_whitespace().next() {
                push_unique(&mut chords, &mut seen, chord);
            }
        } else {
            for chord in token.split_whitespace() {
                push_unique(&mut chords, &mut seen, chord);
            }
        }
    }

    chords
}

fn push_unique(chords: &mut Vec<String>, seen: &mut HashSet<String>, chord: &str) {
    if seen.insert(chord.to_string()) {
        chords.push(chord.to_string());
    }
}
