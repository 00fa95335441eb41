//! Root folder resolution.
//!
//! Roots are matched by path component, in list order. Overlapping roots
//! are a configuration error that is not detected here: the first listed
//! root that contains the path wins.

use crate::models::relocation::RootFolder;
use std::path::{Path, PathBuf};

/// First root whose path is the given path or one of its ancestors.
pub fn find_source_root<'a>(path: &Path, roots: &'a [RootFolder]) -> Option<&'a RootFolder> {
    roots
        .iter()
        .filter(|root| !root.path.as_os_str().is_empty())
        .find(|root| path.starts_with(&root.path))
}

/// The primary (first) destination root.
pub fn primary_dest_root(roots: &[RootFolder]) -> Option<&Path> {
    roots.first().map(|root| root.path.as_path())
}

/// Destination directory for a file: its parent folder name under `dest_root`.
///
/// A file sitting directly in its source root lands directly in `dest_root`.
pub fn destination_directory(source_path: &Path, source_root: &Path, dest_root: &Path) -> PathBuf {
    match source_path.parent() {
        Some(parent) if parent != source_root => match parent.file_name() {
            Some(folder) => dest_root.join(folder),
            None => dest_root.to_path_buf(),
        },
        _ => dest_root.to_path_buf(),
    }
}
