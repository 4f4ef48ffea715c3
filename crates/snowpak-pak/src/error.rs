//! Error types for the pak crate.

use thiserror::Error;

/// Errors that can occur when writing or reading pak archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] snowpak_common::Error),

    /// Invalid ZIP magic bytes.
    #[error("invalid ZIP signature at offset 0x{offset:X}: expected {expected:#010x}, got {actual:#010x}")]
    InvalidSignature {
        offset: u64,
        expected: u32,
        actual: u32,
    },

    /// Could not find the end of central directory record.
    #[error("could not find end of central directory record")]
    EocdNotFound,

    /// ZIP64 record not found when expected.
    #[error("ZIP64 end of central directory not found")]
    Zip64EocdNotFound,

    /// A sentineled field has no value in the ZIP64 extra block.
    #[error("ZIP64 extra field is missing the {0}")]
    MissingZip64Field(&'static str),

    /// Unsupported compression method.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Stored data does not match the recorded checksum.
    #[error("CRC mismatch for '{name}': expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// Source directory missing.
    #[error("source directory '{}' does not exist", .0.display())]
    NotADirectory(std::path::PathBuf),

    /// Location that is neither a directory nor a known archive.
    #[error("can't determine file format from name: '{}'", .0.display())]
    UnknownContainer(std::path::PathBuf),
}

impl Error {
    /// Whether this error reports an already existing destination.
    pub fn is_destination_exists(&self) -> bool {
        matches!(self, Self::Common(snowpak_common::Error::DestinationExists(_)))
    }
}

/// Result type for pak operations.
pub type Result<T> = std::result::Result<T, Error>;
