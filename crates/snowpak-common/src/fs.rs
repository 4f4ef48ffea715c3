//! Filesystem helpers shared by the pack and unpack operations.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Create a file that must not exist yet.
pub fn create_new_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::DestinationExists(path.to_path_buf()),
            _ => Error::Io(e),
        })
}

/// A regular file found below a walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path relative to the root, components joined with `\`.
    pub relative_name: String,
    /// Full path on disk.
    pub path: PathBuf,
    /// Depth below the root; files directly in the root have depth 1.
    pub depth: usize,
}

/// Recursively list the regular files below `root`, in walk order.
pub fn walk_files(root: &Path) -> Result<Vec<WalkedFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push(WalkedFile {
            relative_name: backslash_name(relative),
            path: entry.path().to_path_buf(),
            depth: entry.depth(),
        });
    }
    debug!(root = %root.display(), files = files.len(), "walked directory");
    Ok(files)
}

/// List the immediate children of `root` that are not directories.
pub fn top_level_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// Join the normal components of a relative path with `\`.
pub fn backslash_name(relative: &Path) -> String {
    let mut name = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !name.is_empty() {
                name.push('\\');
            }
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

/// Map a `\`-separated name onto a path below `root`.
pub fn path_from_backslash_name(root: &Path, name: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in name.split('\\').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_create_new_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        create_new_file(&path).unwrap();
        assert!(matches!(
            create_new_file(&path),
            Err(Error::DestinationExists(p)) if p == path
        ));
    }

    #[test]
    fn test_walk_files_uses_backslashes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("[g]").join("sub")).unwrap();
        fs::write(dir.path().join("[g]").join("sub").join("b.txt"), b"b").unwrap();
        fs::write(dir.path().join("[g]").join("a.txt"), b"a").unwrap();

        let files = walk_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.relative_name.as_str()).collect();
        assert_eq!(names, vec!["[g]\\a.txt", "[g]\\sub\\b.txt"]);
        assert_eq!(files[0].depth, 2);
        assert!(top_level_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_path_from_backslash_name() {
        let path = path_from_backslash_name(Path::new("out"), "[g]\\d\\f.txt");
        assert_eq!(path, Path::new("out").join("[g]").join("d").join("f.txt"));
    }
}
