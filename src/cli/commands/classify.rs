//! Classify command implementation.
//!
//! Shows which tier the classifier infers for a path, for debugging the
//! heuristics. Run with `--verbose` to see which signal decided.

use crate::core::{suffix, QualityClassifier};
use crate::models::config::Config;
use crate::models::quality::QualitySignals;
use crate::utils::fs::file_name_string;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Classify `path` with an optional metadata quality name.
pub fn classify(config: &Config, path: &str, quality: Option<&str>) -> Result<()> {
    let classifier = QualityClassifier::new(&config.classifier.uhd_folder_markers);
    let filename = file_name_string(Path::new(path));

    let signals = QualitySignals {
        metadata_name: quality.map(str::to_string),
        full_path: Some(path.to_string()),
        relative_path: None,
        filename: Some(filename.clone()),
    };
    let tier = classifier.classify(&signals);

    println!("{} {}", "Tier:".bold(), tier.label().green());
    if suffix::filename_has_suffix(&filename) {
        println!("{} already suffixed", "Name:".bold());
    } else if !filename.is_empty() {
        println!("{} {}", "Name:".bold(), suffix::add_suffix(&filename, tier));
    }
    Ok(())
}
