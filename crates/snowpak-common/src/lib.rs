//! Common utilities for Snowpak.
//!
//! This crate provides the foundational codec layer shared by all Snowpak crates:
//!
//! - [`ByteReader`] / [`ByteWriter`] - little-endian stream codec with offset tracking
//! - [`names`] - internal `<group>\...` and external `[group]\...` asset names
//! - [`text`] - code page 437 text codec
//! - [`crc`] - CRC32 hashing utilities
//! - [`dos_time`] - MS-DOS timestamps for ZIP records
//! - [`fs`] - create-new files and directory walks

mod error;
mod fixed;
mod reader;
mod scratch;
mod writer;

pub mod crc;
pub mod dos_time;
pub mod fs;
pub mod names;
pub mod text;

pub use dos_time::DosDateTime;
pub use error::{Error, MagicKind, Result};
pub use fixed::FixedValue;
pub use names::{NameParts, NameStyle};
pub use reader::ByteReader;
pub use scratch::{Scratch, CHUNK_SIZE};
pub use writer::ByteWriter;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for byte searching
pub use memchr;
