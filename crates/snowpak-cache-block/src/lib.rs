//! Reader and writer for cache_block files.
//!
//! A cache_block is a flat file-table container: a fixed signature and
//! header, a table of internal names, parallel tables of payload offsets,
//! sizes and zero fields, then the concatenated payloads.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use snowpak_cache_block::{pack_file, CacheBlockReader, UnpackOptions};
//!
//! let entries = pack_file(Path::new("unpacked"), Path::new("initial.cache_block"), |_, _| {})?;
//! println!("packed {} entries", entries.len());
//!
//! let mut reader = CacheBlockReader::open("initial.cache_block")?;
//! reader.unpack_all(Path::new("out"), &UnpackOptions::default(), |_, _| {})?;
//! # Ok::<(), snowpak_cache_block::Error>(())
//! ```

mod entry;
mod error;
pub mod format;
mod reader;
mod writer;

pub use entry::FileEntry;
pub use error::{Error, Result};
pub use reader::{CacheBlockReader, UnpackOptions};
pub use writer::{checked_payload_size, pack_file, scan_directory, CacheBlockWriter};
