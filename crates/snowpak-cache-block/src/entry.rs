//! cache_block file table entries.

use std::path::{Path, PathBuf};

use snowpak_common::fs::path_from_backslash_name;
use snowpak_common::NameStyle;

use crate::Result;

/// A named payload inside a cache_block file.
///
/// Internal names use the game notation (`<group>:file`, `<group>\dir\file`);
/// external names are the matching relative path on disk
/// (`[group]\file`, `[group]\dir\file`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileEntry {
    internal_name: String,
    external_name: String,
    relative_offset: u64,
    size: u32,
}

impl FileEntry {
    /// Create an entry from a name read out of a cache_block.
    pub fn from_internal_name(name: &str) -> Result<Self> {
        let external_name = NameStyle::CacheBlock.to_external(name)?;
        Ok(Self {
            internal_name: name.to_string(),
            external_name,
            relative_offset: 0,
            size: 0,
        })
    }

    /// Create an entry from a `\`-separated path relative to a source directory.
    pub fn from_external_name(name: &str) -> Result<Self> {
        let internal_name = NameStyle::CacheBlock.to_internal(name)?;
        Ok(Self {
            internal_name,
            external_name: name.to_string(),
            relative_offset: 0,
            size: 0,
        })
    }

    #[inline]
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    #[inline]
    pub fn external_name(&self) -> &str {
        &self.external_name
    }

    /// Payload offset relative to the container's base offset.
    #[inline]
    pub fn relative_offset(&self) -> u64 {
        self.relative_offset
    }

    /// Payload size in bytes.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn set_location(&mut self, relative_offset: u64, size: u32) {
        self.relative_offset = relative_offset;
        self.size = size;
    }

    /// Location of this entry below `root`.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        path_from_backslash_name(root, &self.external_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_inverse() {
        let entry = FileEntry::from_internal_name("<media>:a.xml").unwrap();
        assert_eq!(entry.external_name(), "[media]\\a.xml");

        let entry = FileEntry::from_external_name("[media]\\classes\\a.xml").unwrap();
        assert_eq!(entry.internal_name(), "<media>\\classes\\a.xml");
    }

    #[test]
    fn test_output_path() {
        let entry = FileEntry::from_internal_name("<media>\\d\\a.xml").unwrap();
        assert_eq!(
            entry.output_path(Path::new("out")),
            Path::new("out").join("[media]").join("d").join("a.xml")
        );
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(FileEntry::from_internal_name("media\\a.xml").is_err());
        assert!(FileEntry::from_external_name("a.txt").is_err());
    }
}
