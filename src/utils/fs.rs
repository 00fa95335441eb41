//! File system utilities.

use crate::utils::hash;
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Supported media file extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "flv", "webm", "ts", "m2ts",
];

/// How a file was moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    /// Same filesystem rename.
    Rename,
    /// Cross filesystem copy followed by deleting the source.
    CopyDelete,
    /// Cross filesystem copy whose source could not be deleted afterwards.
    /// The destination is complete; the source is left behind.
    CopyKeptSource,
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check if a file is a video file based on extension.
pub fn is_video_file(path: &Path) -> bool {
    get_extension(path)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Filename of a path as an owned string.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether two paths refer to the same file on disk.
#[cfg(unix)]
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

/// Whether two paths refer to the same file on disk.
#[cfg(not(unix))]
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

/// Make a file writable by its owner.
#[cfg(unix)]
pub fn ensure_writable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    let mode = perms.mode();
    if mode & 0o200 == 0 {
        perms.set_mode(mode | 0o200);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Make a file writable.
#[cfg(not(unix))]
pub fn ensure_writable(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Insert " (N)" before the extension of `path`.
pub fn numbered_path(path: &Path, n: u32) -> PathBuf {
    let name = file_name_string(path);
    let (stem, extension) = crate::core::suffix::split_filename(&name);
    path.with_file_name(format!("{} ({}){}", stem, n, extension))
}

/// First free path among `path`, `path (1)`, `path (2)`, ...
pub fn unique_destination(path: &Path, max_attempts: u32) -> Result<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }
    for n in 1..=max_attempts {
        let candidate = numbered_path(path, n);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(Error::DestinationCollisionUnresolvable {
        path: path.display().to_string(),
        attempts: max_attempts,
    })
}

/// Move a file from one location to another.
///
/// Tries an atomic rename first and falls back to copy + delete when the
/// paths are on different filesystems. The copy is written under a hidden
/// temporary name and renamed into place, so `to` never holds a partial file.
pub fn move_file(from: &Path, to: &Path, verify_checksum: bool) -> Result<MoveMethod> {
    match fs::rename(from, to) {
        Ok(()) => {
            tracing::debug!("Moved (rename): {:?} -> {:?}", from, to);
            return Ok(MoveMethod::Rename);
        }
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!("Cross-filesystem move detected, using copy+delete");
        }
        Err(e) => return Err(Error::fs("move", from, e)),
    }

    let partial = partial_path(to);
    if let Err(e) = copy_verified(from, &partial, verify_checksum) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    if let Err(e) = fs::rename(&partial, to) {
        let _ = fs::remove_file(&partial);
        return Err(Error::fs("rename", &partial, e));
    }

    Ok(release_source(from))
}

/// Delete the source once its copy is in place. A failure here does not undo
/// the move.
fn release_source(from: &Path) -> MoveMethod {
    match fs::remove_file(from) {
        Ok(()) => {
            tracing::debug!("Moved (copy+delete): {:?}", from);
            MoveMethod::CopyDelete
        }
        Err(e) => {
            tracing::warn!("Copied, but could not remove source {:?}: {}", from, e);
            MoveMethod::CopyKeptSource
        }
    }
}

fn copy_verified(from: &Path, to: &Path, verify_checksum: bool) -> Result<()> {
    fs::copy(from, to).map_err(|e| Error::fs("copy", from, e))?;

    if verify_checksum {
        let original = hash::sha256_file(from)?;
        let copied = hash::sha256_file(to)?;
        if original != copied {
            return Err(Error::fs(
                "verify",
                to,
                io::Error::new(io::ErrorKind::InvalidData, "checksum mismatch after copy"),
            ));
        }
    }
    Ok(())
}

fn partial_path(to: &Path) -> PathBuf {
    to.with_file_name(format!(".{}.partial", file_name_string(to)))
}

/// Remove `dir` if it has no entries. Returns whether it was removed.
pub fn remove_dir_if_empty(dir: &Path) -> io::Result<bool> {
    if fs::read_dir(dir)?.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(dir)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(&PathBuf::from("movie.mkv")));
        assert!(is_video_file(&PathBuf::from("movie.MP4")));
        assert!(is_video_file(&PathBuf::from("movie.m2ts")));
        assert!(!is_video_file(&PathBuf::from("movie.txt")));
        assert!(!is_video_file(&PathBuf::from("movie.nfo")));
        assert!(!is_video_file(&PathBuf::from("movie")));
    }

    #[test]
    fn test_numbered_path() {
        assert_eq!(
            numbered_path(Path::new("/m/Heat - 2160p.mkv"), 2),
            PathBuf::from("/m/Heat - 2160p (2).mkv")
        );
    }

    #[test]
    fn test_unique_destination() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("Heat.mkv");
        assert_eq!(unique_destination(&target, 5).unwrap(), target);

        fs::write(&target, "a").unwrap();
        fs::write(temp_dir.path().join("Heat (1).mkv"), "b").unwrap();
        assert_eq!(
            unique_destination(&target, 5).unwrap(),
            temp_dir.path().join("Heat (2).mkv")
        );
    }

    #[test]
    fn test_unique_destination_exhausted() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("Heat.mkv");
        fs::write(&target, "a").unwrap();
        fs::write(temp_dir.path().join("Heat (1).mkv"), "b").unwrap();

        let err = unique_destination(&target, 1).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DestinationCollisionUnresolvable);
    }

    #[test]
    fn test_move_file_same_filesystem() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("a.mkv");
        let to = temp_dir.path().join("b.mkv");
        fs::write(&from, "video").unwrap();

        let method = move_file(&from, &to, true).unwrap();
        assert_eq!(method, MoveMethod::Rename);
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "video");
    }

    #[test]
    fn test_move_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = move_file(
            &temp_dir.path().join("missing.mkv"),
            &temp_dir.path().join("b.mkv"),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_copy_verified_writes_copy() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("a.mkv");
        let to = temp_dir.path().join("b.mkv");
        fs::write(&from, "video").unwrap();

        copy_verified(&from, &to, true).unwrap();
        assert!(from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "video");
    }

    #[test]
    fn test_release_source_removes_copied_file() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("a.mkv");
        fs::write(&from, "video").unwrap();

        assert_eq!(release_source(&from), MoveMethod::CopyDelete);
        assert!(!from.exists());
    }

    #[test]
    fn test_release_source_failure_keeps_move() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be removed with remove_file
        let from = temp_dir.path().join("a.mkv");
        fs::create_dir(&from).unwrap();

        assert_eq!(release_source(&from), MoveMethod::CopyKeptSource);
        assert!(from.exists());
    }

    #[test]
    fn test_remove_dir_if_empty() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Heat");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("poster.jpg"), "img").unwrap();
        assert!(!remove_dir_if_empty(&dir).unwrap());

        fs::remove_file(dir.join("poster.jpg")).unwrap();
        assert!(remove_dir_if_empty(&dir).unwrap());
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_writable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.mkv");
        fs::write(&file, "video").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o444)).unwrap();

        ensure_writable(&file).unwrap();
        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_ne!(mode & 0o200, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_is_same_file_hard_link() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.mkv");
        let b = temp_dir.path().join("b.mkv");
        let c = temp_dir.path().join("c.mkv");
        fs::write(&a, "video").unwrap();
        fs::hard_link(&a, &b).unwrap();
        fs::write(&c, "video").unwrap();

        assert!(is_same_file(&a, &b));
        assert!(!is_same_file(&a, &c));
    }
}
