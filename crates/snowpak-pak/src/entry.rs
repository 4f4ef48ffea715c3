//! Pak archive entry.

use std::path::{Path, PathBuf};

use snowpak_common::fs::path_from_backslash_name;
use snowpak_common::DosDateTime;

use crate::zip::CompressionMethod;

/// An entry (file) of a pak archive, as recorded in the central directory.
///
/// Use [`PakArchive::read`](crate::PakArchive::read) to get the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PakEntry {
    /// Relative name, `\`-separated.
    pub name: String,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Raw compression method id.
    pub method: u16,
    pub crc32: u32,
    pub local_header_offset: u64,
    pub modified: DosDateTime,
}

impl PakEntry {
    /// The compression method, if known.
    pub fn compression_method(&self) -> Option<CompressionMethod> {
        CompressionMethod::try_from(self.method).ok()
    }

    /// Whether this entry names a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/') || self.name.ends_with('\\')
    }

    /// Where the entry lands when extracted below `root`.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        path_from_backslash_name(root, &self.name.replace('/', "\\"))
    }
}
