//! Download event pipeline.
//!
//! Fetches both instances' root folders, relocates the file, then removes
//! the movie from the 4K instance and adds an import exclusion so it is not
//! re-added by a list sync.

use crate::models::relocation::{
    RelocationFailure, RelocationOutcome, RelocationRequest, RootFolder,
};
use crate::models::webhook::{WebhookMovie, WebhookMovieFile};
use crate::server::AppState;
use crate::services::CatalogApi;
use crate::utils::fs::file_name_string;
use crate::{ErrorKind, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of processing one download event.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    /// "Title (Year)".
    pub movie: String,
    pub outcome: RelocationOutcome,
    pub removed_from_source_catalog: bool,
    pub suppression_added: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Process a download event for `movie` whose file is at `source_path`.
pub async fn process_download(
    state: &AppState,
    movie: &WebhookMovie,
    file: &WebhookMovieFile,
    source_path: PathBuf,
) -> ProcessResult {
    let quality_hint = file.quality_name().map(str::to_string);

    tracing::info!("Processing: {}", label(movie));
    tracing::info!("Source file: {}", source_path.display());
    tracing::info!("Catalog quality: {}", quality_hint.as_deref().unwrap_or("Unknown"));

    let policy = state.config.naming.policy();
    if policy.enable_quality_suffix {
        tracing::info!("Plex naming: adding quality suffix and renaming existing files");
    } else {
        tracing::info!("Using original catalog naming");
    }

    let (uhd_roots, main_roots) = tokio::join!(
        state.uhd_catalog.list_root_folders(),
        state.main_catalog.list_root_folders()
    );

    let request = RelocationRequest {
        source_path,
        movie_title: movie.title().to_string(),
        movie_year: movie.year,
        raw_quality_hint: quality_hint,
        relative_path: file.relative_path.clone(),
        source_roots: roots_or_empty(uhd_roots, state.uhd_catalog.as_ref()),
        dest_roots: roots_or_empty(main_roots, state.main_catalog.as_ref()),
        naming_policy: policy,
    };

    let outcome = run_relocation(Arc::clone(&state.relocator), request).await;

    let mut result = ProcessResult {
        success: outcome.success,
        movie: label(movie),
        outcome,
        removed_from_source_catalog: false,
        suppression_added: false,
        warning: None,
    };

    if !result.success {
        return result;
    }

    log_sibling_summary(&result.outcome);

    if let Err(e) = retire_from_source(state.uhd_catalog.as_ref(), movie, &mut result).await {
        tracing::warn!(
            "File relocated but catalog cleanup for {} failed: {}",
            result.movie,
            e
        );
        result.warning = Some(e.to_string());
    } else {
        tracing::info!("Successfully processed {}", result.movie);
    }

    result
}

/// Run the synchronous relocator off the async workers.
async fn run_relocation(
    relocator: Arc<crate::core::Relocator>,
    request: RelocationRequest,
) -> RelocationOutcome {
    let original_filename = file_name_string(&request.source_path);
    match tokio::task::spawn_blocking(move || relocator.relocate(&request)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Relocation task failed: {}", e);
            RelocationOutcome {
                success: false,
                original_filename,
                error: Some(RelocationFailure {
                    kind: ErrorKind::Other,
                    detail: format!("relocation task failed: {}", e),
                }),
                ..Default::default()
            }
        }
    }
}

/// Delete the movie from the 4K instance and exclude it from re-import.
async fn retire_from_source(
    catalog: &dyn CatalogApi,
    movie: &WebhookMovie,
    result: &mut ProcessResult,
) -> Result<()> {
    let tmdb_id = match movie.tmdb_id {
        Some(id) => Some(id),
        None => catalog.get_record(movie.id).await?.and_then(|r| r.tmdb_id),
    };

    catalog.delete_record(movie.id).await?;
    result.removed_from_source_catalog = true;

    let Some(tmdb_id) = tmdb_id else {
        tracing::warn!("No tmdb id for {}, skipping import exclusion", result.movie);
        return Ok(());
    };

    let existing = catalog.list_suppressions().await?;
    if existing.iter().any(|s| s.tmdb_id == tmdb_id) {
        tracing::debug!("Import exclusion for tmdb {} already present", tmdb_id);
        return Ok(());
    }

    catalog
        .add_suppression(tmdb_id, movie.title(), movie.year)
        .await?;
    result.suppression_added = true;
    Ok(())
}

fn roots_or_empty(roots: Result<Vec<RootFolder>>, catalog: &dyn CatalogApi) -> Vec<RootFolder> {
    match roots {
        Ok(roots) => roots,
        Err(e) => {
            tracing::error!("Failed to get root folders from {}: {}", catalog.base_url(), e);
            Vec::new()
        }
    }
}

fn log_sibling_summary(outcome: &RelocationOutcome) {
    if !outcome.siblings_renamed.is_empty() {
        tracing::info!(
            "Renamed {} existing files for Plex merging",
            outcome.siblings_renamed.len()
        );
    }
    if !outcome.sibling_errors.is_empty() {
        tracing::warn!(
            "{} errors renaming existing files",
            outcome.sibling_errors.len()
        );
        for error in &outcome.sibling_errors {
            tracing::warn!("  {}", error);
        }
    }
}

fn label(movie: &WebhookMovie) -> String {
    match movie.year {
        Some(year) => format!("{} ({})", movie.title(), year),
        None => movie.title().to_string(),
    }
}
