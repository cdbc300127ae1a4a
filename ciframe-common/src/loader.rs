//! Corpus file loader
//!
//! One song per line, nine comma-separated fields:
//! `artist_id,song_id,artist,title,genre,popularity,key,famous_sequences,chords`
//! where `famous_sequences` and `chords` are `;`-separated lists.
//!
//! Any malformed line aborts the load; a partially built corpus is never
//! returned.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::model::SongRow;
use crate::{Error, Result};

pub const FIELD_COUNT: usize = 9;

const ARTIST_ID: usize = 0;
const SONG_ID: usize = 1;
const ARTIST: usize = 2;
const TITLE: usize = 3;
const GENRE: usize = 4;
const POPULARITY: usize = 5;
const KEY: usize = 6;
const FAMOUS_SEQUENCES: usize = 7;
const CHORDS: usize = 8;

/// Missing-value marker used by the dataset export
const NOT_AVAILABLE: &str = "NA";

/// Load all rows from a corpus file
pub fn load_rows(path: &Path) -> Result<Vec<SongRow>> {
    info!("Loading corpus from {}", path.display());
    let file = File::open(path)?;
    read_rows(file)
}

/// Parse every line of `reader` into rows
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<SongRow>> {
    let mut rows = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(&line, index + 1)?);
    }
    debug!(rows = rows.len(), "Corpus rows parsed");
    Ok(rows)
}

/// Parse a single corpus line (`line_no` is 1-based, for error reporting)
pub fn parse_row(line: &str, line_no: usize) -> Result<SongRow> {
    let cleaned = line.replace('"', "");
    let fields: Vec<&str> = cleaned.split(',').map(clean_field).collect();

    if fields.len() != FIELD_COUNT {
        return Err(Error::MalformedRow {
            line: line_no,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    }

    let popularity = parse_popularity(fields[POPULARITY]).ok_or_else(|| Error::MalformedRow {
        line: line_no,
        reason: format!("invalid popularity '{}'", fields[POPULARITY]),
    })?;

    Ok(SongRow {
        artist_id: fields[ARTIST_ID].to_string(),
        song_id: fields[SONG_ID].to_string(),
        artist: fields[ARTIST].to_string(),
        title: fields[TITLE].to_string(),
        genre: fields[GENRE].to_string(),
        popularity,
        key: fields[KEY].to_string(),
        famous_sequences: split_list(fields[FAMOUS_SEQUENCES]),
        raw_chords: fields[CHORDS]
            .split(';')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn clean_field(field: &str) -> &str {
    if field.trim() == NOT_AVAILABLE {
        ""
    } else {
        field
    }
}

/// Popularity is exported with `.` thousands separators ("1.234")
fn parse_popularity(raw: &str) -> Option<i64> {
    raw.trim().replace('.', "").parse().ok()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
