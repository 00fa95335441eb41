//! Relocate command implementation.
//!
//! Runs a single relocation by hand, outside the webhook flow. Root folders
//! not given on the command line are fetched from the catalogs.

use super::catalog_clients;
use crate::cli::args::RelocateArgs;
use crate::core::{Relocator, RelocatorConfig};
use crate::models::config::Config;
use crate::models::relocation::{RelocationOutcome, RelocationRequest, RootFolder};
use crate::utils::fs::file_name_string;
use crate::{Error, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Relocate one file and print the outcome.
pub async fn relocate(config: &Config, args: &RelocateArgs) -> Result<()> {
    let (source_roots, dest_roots) = resolve_roots(config, args).await?;

    let mut naming_policy = config.naming.policy();
    if let Some(enabled) = args.suffix_override() {
        naming_policy.enable_quality_suffix = enabled;
    }

    let request = RelocationRequest {
        source_path: args.source.clone(),
        movie_title: args.title.clone().unwrap_or_else(|| default_title(&args.source)),
        movie_year: args.year,
        raw_quality_hint: args.quality.clone(),
        relative_path: None,
        source_roots,
        dest_roots,
        naming_policy,
    };

    let relocator = Relocator::with_config(RelocatorConfig::from(config));
    let outcome = tokio::task::spawn_blocking(move || relocator.relocate(&request))
        .await
        .map_err(|e| Error::other(format!("relocation task failed: {}", e)))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    match &outcome.error {
        Some(failure) if !outcome.success => {
            Err(Error::other(format!("Relocation failed: {}", failure.detail)))
        }
        _ => Ok(()),
    }
}

async fn resolve_roots(
    config: &Config,
    args: &RelocateArgs,
) -> Result<(Vec<RootFolder>, Vec<RootFolder>)> {
    if !args.source_roots.is_empty() && !args.dest_roots.is_empty() {
        return Ok((to_roots(&args.source_roots), to_roots(&args.dest_roots)));
    }

    config.validate()?;
    let (main, uhd) = catalog_clients(config)?;

    let source_roots = if args.source_roots.is_empty() {
        uhd.list_root_folders().await?
    } else {
        to_roots(&args.source_roots)
    };
    let dest_roots = if args.dest_roots.is_empty() {
        main.list_root_folders().await?
    } else {
        to_roots(&args.dest_roots)
    };

    Ok((source_roots, dest_roots))
}

fn to_roots(paths: &[PathBuf]) -> Vec<RootFolder> {
    paths.iter().map(RootFolder::from_path).collect()
}

/// Folder name of the source, or its stem when it has no parent folder.
fn default_title(source: &Path) -> String {
    source
        .parent()
        .map(file_name_string)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

fn print_outcome(outcome: &RelocationOutcome) {
    if !outcome.success {
        let detail = outcome
            .error
            .as_ref()
            .map(|e| e.detail.as_str())
            .unwrap_or("unknown error");
        println!("{} {}", "[FAIL]".red(), detail);
        return;
    }

    let action = match outcome.operation {
        Some(crate::models::relocation::RelocationOperation::SkippedExists) => "Already in place",
        _ => "Moved",
    };
    println!("{} {}: {}", "[OK]".green(), action.bold(), outcome.original_filename);
    if let Some(dest) = &outcome.destination_path {
        println!("  {} {}", "->".cyan(), dest.display());
    }
    if let Some(tier) = outcome.quality {
        println!("  Quality: {}", tier);
    }
    for renamed in &outcome.siblings_renamed {
        println!("  Renamed existing: {} -> {}", renamed.old, renamed.new);
    }
    for warning in &outcome.warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
    for error in &outcome.sibling_errors {
        println!("  {} {}", "!".yellow(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_from_folder() {
        assert_eq!(
            default_title(Path::new("/uhd/Heat (1995)/heat.mkv")),
            "Heat (1995)"
        );
    }

    #[test]
    fn test_default_title_without_folder() {
        assert_eq!(default_title(Path::new("heat.mkv")), "heat");
    }
}
