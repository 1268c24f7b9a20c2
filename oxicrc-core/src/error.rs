//! Error types for OxiCRC operations.
//!
//! The hashing arithmetic itself cannot fail. Errors only come from the
//! boundaries: opening and mapping the input file, and callers handing the
//! engine something it has no defined behavior for (an empty buffer or an
//! empty algorithm selection).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for OxiCRC operations.
#[derive(Debug, Error)]
pub enum OxiCrcError {
    /// I/O error while opening or mapping the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input has no bytes to hash.
    #[error("Empty input: {}", path.as_ref().map_or_else(|| "<memory>".into(), |p| p.display().to_string()))]
    EmptyInput {
        /// Path of the empty file, if the input came from a file.
        path: Option<PathBuf>,
    },

    /// No algorithm was requested.
    #[error("No hash algorithm selected")]
    EmptySelection,
}

/// Result type alias for OxiCRC operations.
pub type Result<T> = std::result::Result<T, OxiCrcError>;

impl OxiCrcError {
    /// Create an empty input error for a file.
    pub fn empty_file(path: impl Into<PathBuf>) -> Self {
        Self::EmptyInput {
            path: Some(path.into()),
        }
    }

    /// Create an empty input error for an in-memory buffer.
    pub fn empty_buffer() -> Self {
        Self::EmptyInput { path: None }
    }
}
