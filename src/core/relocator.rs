//! Relocation of a finished download into the main library.
//!
//! Steps:
//! 1. Check the source file exists
//! 2. Classify its quality
//! 3. Find the source root and the primary destination root
//! 4. Reconcile existing files in the destination folder (naming enabled)
//! 5. Pick a final name, disambiguating collisions with " (N)"
//! 6. Move the file (rename, or copy + delete across filesystems)
//! 7. Remove the source folder if it is now empty
//!
//! Relocations of the same source path are serialized.

use crate::core::classifier::QualityClassifier;
use crate::core::locks::PathLocks;
use crate::core::reconciler::ExistingFileReconciler;
use crate::core::resolver::{destination_directory, find_source_root, primary_dest_root};
use crate::core::suffix;
use crate::models::config::Config;
use crate::models::quality::{QualitySignals, QualityTier};
use crate::models::relocation::{RelocationOperation, RelocationOutcome, RelocationRequest};
use crate::utils::fs::{
    ensure_writable, file_name_string, is_same_file, move_file, remove_dir_if_empty,
    unique_destination, MoveMethod,
};
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Relocator configuration.
#[derive(Debug, Clone)]
pub struct RelocatorConfig {
    /// Path substrings that mark a 4K library.
    pub uhd_folder_markers: Vec<String>,
    /// Verify cross-filesystem copies with a checksum.
    pub verify_copies: bool,
    /// Upper bound for " (N)" disambiguation.
    pub max_collision_attempts: u32,
}

impl Default for RelocatorConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RelocatorConfig {
    fn from(config: &Config) -> Self {
        Self {
            uhd_folder_markers: config.classifier.uhd_folder_markers.clone(),
            verify_copies: config.relocation.verify_copies,
            max_collision_attempts: config.relocation.max_collision_attempts,
        }
    }
}

/// Moves files between libraries.
#[derive(Debug)]
pub struct Relocator {
    classifier: QualityClassifier,
    verify_copies: bool,
    max_collision_attempts: u32,
    locks: PathLocks,
}

impl Relocator {
    /// Create a new relocator with custom configuration.
    pub fn with_config(config: RelocatorConfig) -> Self {
        Self {
            classifier: QualityClassifier::new(&config.uhd_folder_markers),
            verify_copies: config.verify_copies,
            max_collision_attempts: config.max_collision_attempts.max(1),
            locks: PathLocks::new(),
        }
    }

    /// Create a new relocator with default configuration.
    pub fn new() -> Self {
        Self::with_config(RelocatorConfig::default())
    }

    /// The classifier used for incoming and existing files.
    pub fn classifier(&self) -> &QualityClassifier {
        &self.classifier
    }

    /// Relocate one file. Never panics; failures are reported in the outcome.
    pub fn relocate(&self, request: &RelocationRequest) -> RelocationOutcome {
        let span = tracing::info_span!("relocate", movie = %request.display_title());
        let _enter = span.enter();

        let mut outcome = RelocationOutcome {
            original_filename: file_name_string(&request.source_path),
            ..Default::default()
        };

        match self.run(request, &mut outcome) {
            Ok(()) => outcome.success = true,
            Err(e) => {
                tracing::error!("Relocation failed: {}", e);
                outcome.success = false;
                outcome.error = Some((&e).into());
            }
        }
        outcome
    }

    fn run(&self, request: &RelocationRequest, outcome: &mut RelocationOutcome) -> Result<()> {
        let source = request.source_path.as_path();
        let _guard = self.locks.lock(source);

        if !source.is_file() {
            return Err(Error::SourceNotFound(source.display().to_string()));
        }

        let tier = self.classify_incoming(request, &outcome.original_filename);
        outcome.quality = Some(tier);

        let source_root = find_source_root(source, &request.source_roots)
            .ok_or_else(|| Error::NoMatchingRoot(source.display().to_string()))?;
        let dest_root = primary_dest_root(&request.dest_roots).ok_or(Error::NoDestinationRoot)?;
        let dest_dir = destination_directory(source, &source_root.path, dest_root);

        tracing::info!("Source: {}", source.display());
        tracing::info!("Destination folder: {}", dest_dir.display());

        let policy = request.naming_policy;
        let final_name = if policy.enable_quality_suffix {
            if dest_dir == dest_root {
                tracing::debug!("Destination is the library root, not renaming existing files");
            } else {
                let report = ExistingFileReconciler::new(&self.classifier)
                    .reconcile(&dest_dir, &request.display_title());
                outcome.siblings_renamed = report.renamed;
                outcome.sibling_errors = report.errors;
            }

            let base = if policy.append_to_original_name || dest_dir == dest_root {
                outcome.original_filename.clone()
            } else {
                suffix::with_stem(&outcome.original_filename, &file_name_string(&dest_dir))
            };
            suffix::add_suffix(&base, tier)
        } else {
            outcome.original_filename.clone()
        };

        let planned = dest_dir.join(&final_name);
        if planned.exists() && is_same_file(source, &planned) {
            tracing::warn!("Destination already exists: {}", planned.display());
            outcome.operation = Some(RelocationOperation::SkippedExists);
            outcome.renamed = final_name != outcome.original_filename;
            outcome.final_filename = Some(final_name);
            outcome.destination_path = Some(planned);
            return Ok(());
        }

        let destination = unique_destination(&planned, self.max_collision_attempts)?;
        if destination != planned {
            tracing::warn!(
                "Destination already exists, using {}",
                destination.display()
            );
        }

        let created_dir = !dest_dir.exists();
        fs::create_dir_all(&dest_dir).map_err(|e| Error::fs("create directory", &dest_dir, e))?;

        if let Err(e) = ensure_writable(source) {
            tracing::warn!("Could not make {} writable: {}", source.display(), e);
        }

        let method = match move_file(source, &destination, self.verify_copies) {
            Ok(method) => method,
            Err(e) => {
                if created_dir {
                    cleanup_dest_dir(&dest_dir);
                }
                return Err(e);
            }
        };
        tracing::info!(
            "Moved ({}): {} -> {}",
            match method {
                MoveMethod::Rename => "rename",
                MoveMethod::CopyDelete | MoveMethod::CopyKeptSource => "copy+delete",
            },
            source.display(),
            destination.display()
        );

        if method == MoveMethod::CopyKeptSource {
            outcome
                .warnings
                .push(format!("source file could not be removed: {}", source.display()));
        } else if let Some(parent) = source.parent() {
            if parent != source_root.path {
                cleanup_source_dir(parent);
            }
        }

        let final_filename = file_name_string(&destination);
        outcome.renamed = final_filename != outcome.original_filename;
        if outcome.renamed {
            tracing::info!("Renamed: {} -> {}", outcome.original_filename, final_filename);
        }
        outcome.final_filename = Some(final_filename);
        outcome.destination_path = Some(destination);
        outcome.operation = Some(RelocationOperation::Moved);
        Ok(())
    }

    /// Metadata hint first, then path, folder convention and filename.
    fn classify_incoming(&self, request: &RelocationRequest, filename: &str) -> QualityTier {
        let signals = QualitySignals {
            metadata_name: request.raw_quality_hint.clone(),
            full_path: Some(request.source_path.to_string_lossy().into_owned()),
            relative_path: request.relative_path.clone(),
            filename: Some(filename.to_string()),
        };
        let tier = self.classifier.classify(&signals);
        tracing::info!(
            "Quality mapping: '{}' -> '{}'",
            request.raw_quality_hint.as_deref().unwrap_or("Unknown"),
            tier
        );
        tier
    }
}

impl Default for Relocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort removal of an emptied source folder.
fn cleanup_source_dir(dir: &Path) {
    match remove_dir_if_empty(dir) {
        Ok(true) => tracing::info!("Removed empty source folder: {}", dir.display()),
        Ok(false) => tracing::debug!("Source folder not empty, keeping: {}", dir.display()),
        Err(e) => tracing::warn!("Could not remove source folder {}: {}", dir.display(), e),
    }
}

/// Remove a destination folder created for a move that then failed.
fn cleanup_dest_dir(dir: &Path) {
    if let Err(e) = remove_dir_if_empty(dir) {
        tracing::warn!("Could not remove destination folder {}: {}", dir.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::relocation::{NamingPolicy, RootFolder};
    use crate::ErrorKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn request(source: PathBuf, source_root: &Path, dest_root: &Path) -> RelocationRequest {
        RelocationRequest {
            source_path: source,
            movie_title: "Heat".to_string(),
            movie_year: Some(1995),
            raw_quality_hint: Some("Bluray-2160p".to_string()),
            relative_path: None,
            source_roots: vec![RootFolder::from_path(source_root)],
            dest_roots: vec![RootFolder::from_path(dest_root)],
            naming_policy: NamingPolicy {
                enable_quality_suffix: true,
                append_to_original_name: true,
            },
        }
    }

    #[test]
    fn test_relocate_with_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let uhd = temp_dir.path().join("uhd");
        let movies = temp_dir.path().join("movies");
        fs::create_dir_all(uhd.join("Heat (1995)")).unwrap();
        fs::create_dir_all(&movies).unwrap();
        let source = uhd.join("Heat (1995)").join("Heat (1995).mkv");
        fs::write(&source, "4k").unwrap();

        let outcome = Relocator::new().relocate(&request(source.clone(), &uhd, &movies));

        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(outcome.final_filename.as_deref(), Some("Heat (1995) - 2160p.mkv"));
        assert!(outcome.renamed);
        assert_eq!(outcome.quality, Some(QualityTier::Uhd2160));
        assert_eq!(outcome.operation, Some(RelocationOperation::Moved));
        assert!(movies.join("Heat (1995)").join("Heat (1995) - 2160p.mkv").exists());
        assert!(!source.exists());
        assert!(!uhd.join("Heat (1995)").exists());
        assert!(uhd.exists());
    }

    #[test]
    fn test_relocate_folder_name_policy() {
        let temp_dir = TempDir::new().unwrap();
        let uhd = temp_dir.path().join("uhd");
        let movies = temp_dir.path().join("movies");
        fs::create_dir_all(uhd.join("Heat (1995)")).unwrap();
        let source = uhd.join("Heat (1995)").join("heat.1995.remux.mkv");
        fs::write(&source, "4k").unwrap();

        let mut req = request(source, &uhd, &movies);
        req.naming_policy.append_to_original_name = false;
        let outcome = Relocator::new().relocate(&req);

        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(outcome.final_filename.as_deref(), Some("Heat (1995) - 2160p.mkv"));
    }

    #[test]
    fn test_relocate_missing_destination_roots() {
        let temp_dir = TempDir::new().unwrap();
        let uhd = temp_dir.path().join("uhd");
        fs::create_dir_all(uhd.join("Heat")).unwrap();
        let source = uhd.join("Heat").join("Heat.mkv");
        fs::write(&source, "4k").unwrap();

        let mut req = request(source.clone(), &uhd, &uhd);
        req.dest_roots.clear();
        let outcome = Relocator::new().relocate(&req);

        assert!(!outcome.success);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::NoDestinationRoot));
        assert!(source.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_relocate_same_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let uhd = temp_dir.path().join("uhd");
        let movies = temp_dir.path().join("movies");
        fs::create_dir_all(uhd.join("Heat")).unwrap();
        fs::create_dir_all(movies.join("Heat")).unwrap();
        let source = uhd.join("Heat").join("Heat.mkv");
        fs::write(&source, "4k").unwrap();
        fs::hard_link(&source, movies.join("Heat").join("Heat.mkv")).unwrap();

        let mut req = request(source.clone(), &uhd, &movies);
        req.naming_policy.enable_quality_suffix = false;
        let outcome = Relocator::new().relocate(&req);

        assert!(outcome.success);
        assert_eq!(outcome.operation, Some(RelocationOperation::SkippedExists));
        assert!(source.exists());
    }
}
