//! Error types for the cache_block crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with cache_block files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] snowpak_common::Error),

    /// A relative payload offset was negative.
    #[error("entry {index} has negative offset {offset}")]
    NegativeOffset { index: usize, offset: i64 },

    /// The source of a pack operation is not a directory.
    #[error("source is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl Error {
    /// Whether this error reports an already existing destination.
    pub fn is_destination_exists(&self) -> bool {
        matches!(self, Self::Common(snowpak_common::Error::DestinationExists(_)))
    }
}

/// Result type for cache_block operations.
pub type Result<T> = std::result::Result<T, Error>;
