//! Pak archives.
//!
//! A pak is a ZIP archive whose members are all stored without compression,
//! with ZIP64 records wherever a size, offset or count outgrows its legacy
//! field. The game expects `\` as the path separator in member names and the
//! load list as the very first member.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use snowpak_pak::{write_pak, PakArchive, PakOptions};
//!
//! write_pak(Path::new("initial"), Path::new("initial.pak"), &PakOptions::default(), |_, _| {})?;
//!
//! let archive = PakArchive::open("initial.pak")?;
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name, entry.uncompressed_size);
//! }
//! # Ok::<(), snowpak_pak::Error>(())
//! ```

mod archive;
mod comparer;
mod container;
mod entry;
mod error;
mod writer;
pub mod zip;

pub use archive::{local_headers, read_local_headers, LocalHeaderRecord, PakArchive};
pub use comparer::{compare_ignore_case, PakableNameComparer, LOAD_LIST_NAME};
pub use container::{ContainerKind, FilesContainer, ARCHIVE_EXTENSIONS};
pub use entry::PakEntry;
pub use error::{Error, Result};
pub use writer::{collect_files, pack_files, write_pak, PakOptions, PakWriter};
