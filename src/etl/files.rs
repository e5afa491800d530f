//! Source file discovery.

use crate::error::LoadError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

fn is_json_file(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_file() && !name.starts_with('.') && name.ends_with(".json")
}

/// Recursively list the `*.json` files under `root`.
///
/// Paths are absolute and sorted by file name within each directory, so two
/// runs over the same tree visit files in the same order. Unreadable entries
/// below the root are logged and skipped.
pub fn enumerate_json_files(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let unreadable_root = |source| LoadError::UnreadableFile {
        path: root.to_path_buf(),
        source,
    };

    let root = root.canonicalize().map_err(unreadable_root)?;
    if !root.is_dir() {
        return Err(unreadable_root(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a directory",
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        match entry {
            Ok(entry) if is_json_file(&entry) => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!("Error accessing entry under {}: {}", root.display(), e),
        }
    }
    Ok(files)
}
