//! Quality suffix handling for filenames.
//!
//! A suffixed name looks like `Movie (2019) - 2160p.mkv`. Only the numeric
//! form is recognized, so names ending in " - 4K" or " - SD" get a numeric
//! suffix appended. A trailing collision marker such as " (1)" does not hide
//! the suffix in front of it.

use crate::models::quality::QualityTier;
use once_cell::sync::Lazy;
use regex::Regex;

static SUFFIX_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i) - \d{3,4}p(?: \(\d+\))?$").ok());

/// Split a filename into stem and extension (extension keeps its dot).
///
/// A leading dot is part of the stem, so ".mkv" has no extension.
pub fn split_filename(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Whether a name without extension already ends with a quality suffix.
pub fn has_suffix(name_without_extension: &str) -> bool {
    SUFFIX_PATTERN
        .as_ref()
        .map_or(false, |re| re.is_match(name_without_extension))
}

/// Whether a full filename already carries a quality suffix.
pub fn filename_has_suffix(filename: &str) -> bool {
    has_suffix(split_filename(filename).0)
}

/// Append " - <tier>" before the extension unless a suffix is present.
pub fn add_suffix(filename: &str, tier: QualityTier) -> String {
    let (stem, extension) = split_filename(filename);
    if has_suffix(stem) {
        return filename.to_string();
    }
    format!("{} - {}{}", stem, tier.label(), extension)
}

/// Replace the stem of `filename`, keeping its extension.
pub fn with_stem(filename: &str, stem: &str) -> String {
    let (_, extension) = split_filename(filename);
    format!("{}{}", stem, extension)
}
