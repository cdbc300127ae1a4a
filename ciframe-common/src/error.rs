//! Common error types for Ciframe

use thiserror::Error;

/// Common result type for Ciframe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while bootstrapping the catalog
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Corpus line that cannot be turned into a song
    #[error("Malformed corpus row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Two rows resolved to the same unique song id
    #[error("Duplicate song id: {0}")]
    DuplicateSong(String),
}
