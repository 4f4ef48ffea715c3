//! Error types for the list formats.

use thiserror::Error;

use crate::load_list::EntryType;

/// Errors that can occur when reading or writing list files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] snowpak_common::Error),

    /// A load list needs at least its start and end entries.
    #[error("invalid number of load list entries: {count}")]
    TooFewEntries { count: usize },

    /// A type byte is not one of the known entry types.
    #[error("unknown type 0x{value:X} for entry {index} at offset 0x{offset:X}")]
    InvalidEntryType { index: usize, value: u8, offset: u64 },

    /// A known entry type at a position where it is not allowed.
    #[error("unexpected {found} entry at index {index} (offset 0x{offset:X})")]
    UnexpectedEntryType {
        index: usize,
        found: EntryType,
        offset: u64,
    },

    /// The number of strings does not match the entry type.
    #[error("unexpected strings count ({count}) for {entry_type} entry {index} at offset 0x{offset:X}")]
    InvalidStringCount {
        index: usize,
        entry_type: EntryType,
        count: usize,
        offset: u64,
    },

    /// A dependency index points outside the entry table.
    #[error("invalid dependency index {dependency} for entry {index} at offset 0x{offset:X}")]
    InvalidDependency {
        index: usize,
        dependency: i64,
        offset: u64,
    },

    /// A magic array has the wrong length for its entry.
    #[error("magic array 'A' of entry {index} has {actual} byte(s), expected {expected}")]
    InvalidMagicArray {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    /// Whether this error reports an already existing destination.
    pub fn is_destination_exists(&self) -> bool {
        matches!(self, Self::Common(snowpak_common::Error::DestinationExists(_)))
    }
}

/// Result type for list operations.
pub type Result<T> = std::result::Result<T, Error>;
