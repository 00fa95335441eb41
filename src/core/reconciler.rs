//! Existing file reconciliation.
//!
//! Before a new version of a movie is placed next to existing ones, every
//! media file in the destination folder without a quality suffix gets one,
//! so the media server groups them as versions of one title.

use crate::core::classifier::QualityClassifier;
use crate::core::suffix;
use crate::models::relocation::RenamedFile;
use crate::utils::fs::{file_name_string, is_video_file};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Result of reconciling a folder. Failures are per file and non-fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub renamed: Vec<RenamedFile>,
    pub errors: Vec<String>,
}

/// Renames existing media files so they carry a quality suffix.
#[derive(Debug, Clone)]
pub struct ExistingFileReconciler<'a> {
    classifier: &'a QualityClassifier,
}

impl<'a> ExistingFileReconciler<'a> {
    pub fn new(classifier: &'a QualityClassifier) -> Self {
        Self { classifier }
    }

    /// Suffix every unsuffixed media file directly inside `directory`.
    ///
    /// A missing directory is not an error. `context` only labels log output.
    pub fn reconcile(&self, directory: &Path, context: &str) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if !directory.is_dir() {
            tracing::debug!("No existing folder to reconcile for {}: {:?}", context, directory);
            return report;
        }

        tracing::info!("Scanning for existing files to rename in: {}", directory.display());

        // Collect first so renames don't show up in the listing being walked.
        let entries: Vec<_> = WalkDir::new(directory).min_depth(1).max_depth(1).into_iter().collect();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let message = format!("failed to read entry in {}: {}", directory.display(), e);
                    tracing::error!("{}", message);
                    report.errors.push(message);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_video_file(entry.path()) {
                continue;
            }

            let name = file_name_string(entry.path());
            match self.reconcile_file(entry.path(), &name) {
                Ok(Some(new_name)) => {
                    tracing::info!("  Renamed: {} -> {}", name, new_name);
                    report.renamed.push(RenamedFile { old: name, new: new_name });
                }
                Ok(None) => {
                    tracing::debug!("  Already has quality suffix: {}", name);
                }
                Err(cause) => {
                    let message = format!("failed to rename {}: {}", name, cause);
                    tracing::error!("  {}", message);
                    report.errors.push(message);
                }
            }
        }

        if !report.renamed.is_empty() {
            tracing::info!(
                "Renamed {} existing files for {}",
                report.renamed.len(),
                context
            );
        }

        report
    }

    /// Rename one file. `Ok(None)` means it was already conformant.
    fn reconcile_file(&self, path: &Path, name: &str) -> std::result::Result<Option<String>, String> {
        if suffix::filename_has_suffix(name) {
            return Ok(None);
        }

        let tier = self.classifier.classify_filename(name);
        let new_name = suffix::add_suffix(name, tier);
        let new_path = path.with_file_name(&new_name);

        if new_path.exists() {
            return Err(format!("{} already exists", new_name));
        }

        fs::rename(path, &new_path).map_err(|e| e.to_string())?;
        Ok(Some(new_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_is_empty_report() {
        let classifier = QualityClassifier::default();
        let reconciler = ExistingFileReconciler::new(&classifier);
        let report = reconciler.reconcile(Path::new("/nonexistent/folder"), "Heat (1995)");
        assert_eq!(report, ReconcileReport::default());
    }

    #[test]
    fn test_default_tier_rename() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Foo.mkv"), "video").unwrap();

        let classifier = QualityClassifier::default();
        let report = ExistingFileReconciler::new(&classifier).reconcile(temp_dir.path(), "Foo");

        assert_eq!(
            report.renamed,
            vec![RenamedFile {
                old: "Foo.mkv".to_string(),
                new: "Foo - 1080p.mkv".to_string(),
            }]
        );
        assert!(report.errors.is_empty());
        assert!(temp_dir.path().join("Foo - 1080p.mkv").exists());
    }
}
