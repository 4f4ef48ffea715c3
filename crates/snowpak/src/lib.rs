//! Snowpak - asset container formats of a vehicle-simulation game.
//!
//! This crate provides a unified interface to the Snowpak library crates.
//!
//! # Crates
//!
//! - [`snowpak_common`] - Byte codec, asset names, code page 437, DOS time
//! - [`snowpak_cache_block`] - `.cache_block` file tables
//! - [`snowpak_lists`] - `pak.load_list` and `.sound_list`
//! - [`snowpak_pak`] - stored ZIP64 pak archives
//!
//! # Example
//!
//! ```no_run
//! use snowpak::prelude::*;
//!
//! let list = LoadList::read_file("initial/pak.load_list")?;
//! for warning in list.validate_ordering() {
//!     eprintln!("{warning}");
//! }
//!
//! write_pak(
//!     std::path::Path::new("initial"),
//!     std::path::Path::new("initial.pak"),
//!     &PakOptions::default(),
//!     |_, _| {},
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use snowpak_cache_block as cache_block;
pub use snowpak_common as common;
pub use snowpak_lists as lists;
pub use snowpak_pak as pak;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use snowpak_cache_block::{
        pack_file, CacheBlockReader, CacheBlockWriter, FileEntry, UnpackOptions,
    };
    pub use snowpak_common::{ByteReader, ByteWriter, DosDateTime, NameStyle};
    pub use snowpak_lists::{
        read_sound_list_file, write_sound_list_file, AssetEntry, EntryKind, LoadList,
        LoadListEntry, OrderingWarning,
    };
    pub use snowpak_pak::{
        local_headers, write_pak, FilesContainer, PakArchive, PakEntry, PakOptions, PakWriter,
        LOAD_LIST_NAME,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
