//! A list of relative file names taken from a directory or an archive.

use std::path::{Path, PathBuf};

use snowpak_common::fs::walk_files;
use tracing::debug;

use crate::archive::PakArchive;
use crate::{Error, Result};

/// File extensions opened as archives.
pub const ARCHIVE_EXTENSIONS: [&str; 2] = ["pak", "zip"];

/// Where the names of a [`FilesContainer`] come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Directory,
    Archive,
}

/// Relative file names of a directory tree or a pak archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesContainer {
    location: PathBuf,
    kind: ContainerKind,
}

impl FilesContainer {
    /// Decide what `location` is.
    ///
    /// Existing directories are directories; names with a known archive
    /// extension are archives. Any other existing file is rejected, and a
    /// missing location without a known extension is taken as a directory.
    pub fn from_location<P: AsRef<Path>>(location: P) -> Result<Self> {
        let location = location.as_ref().to_path_buf();
        let kind = if location.is_dir() {
            ContainerKind::Directory
        } else if has_archive_extension(&location) {
            ContainerKind::Archive
        } else if location.exists() {
            return Err(Error::UnknownContainer(location));
        } else {
            ContainerKind::Directory
        };
        Ok(Self { location, kind })
    }

    /// The location as given.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Whether the container is a single file.
    pub fn is_single_file(&self) -> bool {
        self.kind == ContainerKind::Archive
    }

    /// Whether the location exists as the expected kind of object.
    pub fn exists(&self) -> bool {
        match self.kind {
            ContainerKind::Directory => self.location.is_dir(),
            ContainerKind::Archive => self.location.is_file(),
        }
    }

    /// The `\`-separated relative names of all files in the container.
    pub fn files(&self) -> Result<Vec<String>> {
        let names: Vec<String> = match self.kind {
            ContainerKind::Directory => walk_files(&self.location)?
                .into_iter()
                .map(|f| f.relative_name)
                .collect(),
            ContainerKind::Archive => PakArchive::open(&self.location)?
                .entries()
                .iter()
                .map(|e| e.name.clone())
                .collect(),
        };
        debug!(
            location = %self.location.display(),
            kind = ?self.kind,
            files = names.len(),
            "listed container"
        );
        Ok(names)
    }
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ARCHIVE_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
}
