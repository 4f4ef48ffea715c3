//! Error types for snowpak-common.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Width of a magic value that failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicKind {
    /// A single byte.
    Byte,
    /// A 32-bit little-endian value.
    Dword,
}

impl fmt::Display for MagicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => f.write_str("byte"),
            Self::Dword => f.write_str("dword"),
        }
    }
}

/// Common error type for Snowpak operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes were available than the format requires.
    #[error("unexpected end of stream at offset 0x{offset:X}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// A fixed constant did not match at a known stream position.
    #[error("unexpected {kind} 0x{actual:X} at offset 0x{offset:X} (should be 0x{expected:X})")]
    BadMagic {
        offset: u64,
        kind: MagicKind,
        expected: u64,
        actual: u64,
    },

    /// The fixed file signature blob did not match.
    #[error("malformed file signature")]
    MalformedSignature,

    /// A name failed the internal/external name grammar.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A value does not fit the field that has to carry it.
    #[error("{what} {value} exceeds the limit of {limit}")]
    SizeOverflow {
        what: &'static str,
        value: u64,
        limit: u64,
    },

    /// A length prefix decoded to a value the format cannot hold.
    #[error("invalid length {length} at offset 0x{offset:X}")]
    InvalidLength { offset: u64, length: i64 },

    /// The target of a pack/unpack operation is already present.
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// The stream continues past its logical end.
    #[error("unexpected data beyond logical end of stream at offset 0x{offset:X}")]
    TrailingData { offset: u64 },

    /// Text contains a character outside code page 437.
    #[error("character {character:?} cannot be encoded in code page 437")]
    Unencodable { character: char },

    /// Directory walk failure.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_name(name: &str, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            reason,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_magic_message_is_hex() {
        let err = Error::BadMagic {
            offset: 0x44,
            kind: MagicKind::Dword,
            expected: 4,
            actual: 0x1F,
        };
        assert_eq!(
            err.to_string(),
            "unexpected dword 0x1F at offset 0x44 (should be 0x4)"
        );
    }
}
