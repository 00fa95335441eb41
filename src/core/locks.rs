//! Per-path mutual exclusion.
//!
//! Two deliveries of the same event must not relocate the same file at the
//! same time. A path is "busy" while a guard for it exists; other callers
//! for the same path block until the guard is dropped. Different paths
//! never block each other.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, PoisonError};

/// Set of paths currently being worked on.
#[derive(Debug, Default)]
pub struct PathLocks {
    busy: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

/// Held for as long as the path is being worked on.
#[derive(Debug)]
pub struct PathGuard<'a> {
    owner: &'a PathLocks,
    key: PathBuf,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `path` is free, then mark it busy.
    pub fn lock(&self, path: &Path) -> PathGuard<'_> {
        let key = normalize(path);
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        while busy.contains(&key) {
            tracing::debug!("Waiting for in-flight relocation of {}", key.display());
            busy = self
                .released
                .wait(busy)
                .unwrap_or_else(PoisonError::into_inner);
        }
        busy.insert(key.clone());
        PathGuard { owner: self, key }
    }

    /// Number of paths currently busy.
    pub fn len(&self) -> usize {
        self.busy.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        let mut busy = self.owner.busy.lock().unwrap_or_else(PoisonError::into_inner);
        busy.remove(&self.key);
        self.owner.released.notify_all();
    }
}

/// Canonical form when the path exists, otherwise the path as given.
fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_guard_releases_entry() {
        let locks = PathLocks::new();
        {
            let _guard = locks.lock(Path::new("/uhd/Heat/Heat.mkv"));
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_different_paths_do_not_block() {
        let locks = PathLocks::new();
        let _a = locks.lock(Path::new("/uhd/a.mkv"));
        let _b = locks.lock(Path::new("/uhd/b.mkv"));
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_same_path_is_serialized() {
        let locks = Arc::new(PathLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    let _guard = locks.lock(Path::new("/uhd/same.mkv"));
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }
}
