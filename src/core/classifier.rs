//! Quality classifier.
//!
//! Maps the available quality signals for a file to a [`QualityTier`]:
//! 1. Metadata quality name (table lookup, then token scan of the name)
//! 2. Token scan of the full and relative paths
//! 3. 4K folder markers in the path
//! 4. Token scan of the bare filename
//! 5. 1080p
//!
//! Classification never fails.

use crate::models::quality::{QualitySignals, QualityTier};
use once_cell::sync::Lazy;
use regex::Regex;

/// Metadata name that carries no quality information.
const UNKNOWN_QUALITY: &str = "Unknown";

/// Known metadata quality names.
pub const QUALITY_TABLE: &[(&str, QualityTier)] = &[
    // 4K/UHD variants
    ("WEBDL-2160p", QualityTier::Uhd2160),
    ("WEBRip-2160p", QualityTier::Uhd2160),
    ("Bluray-2160p", QualityTier::Uhd2160),
    ("Remux-2160p", QualityTier::Uhd2160),
    ("HDTV-2160p", QualityTier::Uhd2160),
    // 1080p variants
    ("WEBDL-1080p", QualityTier::FullHd1080),
    ("WEBRip-1080p", QualityTier::FullHd1080),
    ("Bluray-1080p", QualityTier::FullHd1080),
    ("Remux-1080p", QualityTier::FullHd1080),
    ("HDTV-1080p", QualityTier::FullHd1080),
    // 720p variants
    ("WEBDL-720p", QualityTier::Hd720),
    ("WEBRip-720p", QualityTier::Hd720),
    ("Bluray-720p", QualityTier::Hd720),
    ("HDTV-720p", QualityTier::Hd720),
    // SD variants
    ("WEBDL-480p", QualityTier::Sd480),
    ("WEBRip-480p", QualityTier::Sd480),
    ("Bluray-480p", QualityTier::Sd480),
    ("Bluray-576p", QualityTier::Sd480),
    ("DVD", QualityTier::Sd480),
    ("DVD-R", QualityTier::Sd480),
    ("SDTV", QualityTier::Sd480),
    // Source-only names carry no resolution
    ("Remux", QualityTier::FullHd1080),
    ("BluRay", QualityTier::FullHd1080),
    ("WEB-DL", QualityTier::FullHd1080),
    // Bare resolutions
    ("2160p", QualityTier::Uhd2160),
    ("1080p", QualityTier::FullHd1080),
    ("720p", QualityTier::Hd720),
    ("480p", QualityTier::Sd480),
];

/// Token patterns per tier, checked highest resolution first.
///
/// Resolution tokens must not follow a digit; word tokens must not follow
/// a letter or digit. Only "uhd" and "dvd" may run into trailing letters
/// (UHDRip, DVDRip) so "hd" never matches HDR or HDTV.
static TOKEN_PATTERNS: Lazy<Vec<(QualityTier, Regex)>> = Lazy::new(|| {
    [
        (
            QualityTier::Uhd2160,
            r"(?i)(?:^|[^0-9])2160p(?:$|[^a-z0-9])|(?:^|[^a-z0-9])(?:4k(?:$|[^a-z0-9])|uhd)",
        ),
        (
            QualityTier::FullHd1080,
            r"(?i)(?:^|[^0-9])1080p(?:$|[^a-z0-9])|(?:^|[^a-z0-9])fhd(?:$|[^a-z0-9])",
        ),
        (
            QualityTier::Hd720,
            r"(?i)(?:^|[^0-9])720p(?:$|[^a-z0-9])|(?:^|[^a-z0-9])hd(?:$|[^a-z0-9])",
        ),
        (
            QualityTier::Sd480,
            r"(?i)(?:^|[^0-9])480p(?:$|[^a-z0-9])|(?:^|[^a-z0-9])(?:sd(?:$|[^a-z0-9])|dvd)",
        ),
    ]
    .into_iter()
    .filter_map(|(tier, pattern)| Regex::new(pattern).ok().map(|re| (tier, re)))
    .collect()
});

/// Look up a metadata quality name in [`QUALITY_TABLE`].
pub fn lookup_quality_name(name: &str) -> Option<QualityTier> {
    let name = name.trim();
    QUALITY_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, tier)| *tier)
}

/// Scan free text for quality tokens.
pub fn detect_tokens(text: &str) -> Option<QualityTier> {
    TOKEN_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(tier, _)| *tier)
}

/// Quality classifier.
#[derive(Debug, Clone)]
pub struct QualityClassifier {
    /// Lowercased path substrings that mark a 4K library.
    uhd_folder_markers: Vec<String>,
}

impl QualityClassifier {
    /// Create a classifier with the given 4K folder markers.
    pub fn new<I, S>(uhd_folder_markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            uhd_folder_markers: uhd_folder_markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Folder markers in use.
    pub fn uhd_folder_markers(&self) -> &[String] {
        &self.uhd_folder_markers
    }

    /// Classify a file. Always returns a tier.
    pub fn classify(&self, signals: &QualitySignals) -> QualityTier {
        if let Some(tier) = signals.metadata_name.as_deref().and_then(classify_metadata) {
            tracing::debug!("Quality {} from metadata {:?}", tier, signals.metadata_name);
            return tier;
        }

        let paths = [signals.full_path.as_deref(), signals.relative_path.as_deref()];
        for path in paths.into_iter().flatten() {
            if let Some(tier) = detect_tokens(path) {
                tracing::debug!("Quality {} from path {}", tier, path);
                return tier;
            }
        }

        for path in paths.into_iter().flatten() {
            if self.is_uhd_folder(path) {
                tracing::debug!("Quality 2160p from 4K folder convention: {}", path);
                return QualityTier::Uhd2160;
            }
        }

        if let Some(tier) = signals.filename.as_deref().and_then(detect_tokens) {
            tracing::debug!("Quality {} from filename {:?}", tier, signals.filename);
            return tier;
        }

        tracing::debug!("Could not detect quality, defaulting to {}", QualityTier::default());
        QualityTier::default()
    }

    /// Classify from a bare filename only.
    pub fn classify_filename(&self, filename: &str) -> QualityTier {
        self.classify(&QualitySignals::from_filename(filename))
    }

    fn is_uhd_folder(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        self.uhd_folder_markers.iter().any(|m| lower.contains(m))
    }
}

impl Default for QualityClassifier {
    fn default() -> Self {
        Self::new(crate::models::config::ClassifierConfig::default().uhd_folder_markers)
    }
}

/// Metadata names: table first, then tokens. "Unknown" is ignored.
fn classify_metadata(name: &str) -> Option<QualityTier> {
    let name = name.trim();
    if name.is_empty() || name.eq_ignore_ascii_case(UNKNOWN_QUALITY) {
        return None;
    }
    lookup_quality_name(name).or_else(|| detect_tokens(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(name: &str, path: &str) -> QualitySignals {
        QualitySignals {
            metadata_name: Some(name.to_string()),
            full_path: Some(path.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_token_patterns_compile() {
        assert_eq!(TOKEN_PATTERNS.len(), 4);
    }

    #[test]
    fn test_table_lookup_is_case_insensitive() {
        assert_eq!(lookup_quality_name("bluray-2160p"), Some(QualityTier::Uhd2160));
        assert_eq!(lookup_quality_name("SDTV"), Some(QualityTier::Sd480));
        assert_eq!(lookup_quality_name("Remux"), Some(QualityTier::FullHd1080));
        assert_eq!(lookup_quality_name("Telesync"), None);
    }

    #[test]
    fn test_detect_tokens() {
        assert_eq!(detect_tokens("Movie.2019.2160p.x265.mkv"), Some(QualityTier::Uhd2160));
        assert_eq!(detect_tokens("Movie.4K.HDR.mkv"), Some(QualityTier::Uhd2160));
        assert_eq!(detect_tokens("Movie.UHDRip.mkv"), Some(QualityTier::Uhd2160));
        assert_eq!(detect_tokens("Movie 1080p WEB-DL.mkv"), Some(QualityTier::FullHd1080));
        assert_eq!(detect_tokens("Movie.FHD.mkv"), Some(QualityTier::FullHd1080));
        assert_eq!(detect_tokens("Movie-720p.mp4"), Some(QualityTier::Hd720));
        assert_eq!(detect_tokens("Movie [HD].mp4"), Some(QualityTier::Hd720));
        assert_eq!(detect_tokens("Movie.DVDRip.avi"), Some(QualityTier::Sd480));
        assert_eq!(detect_tokens("Movie.SD.avi"), Some(QualityTier::Sd480));
    }

    #[test]
    fn test_detect_tokens_avoids_false_positives() {
        assert_eq!(detect_tokens("Movie.HDR.mkv"), None);
        assert_eq!(detect_tokens("Movie.HDTV.mkv"), None);
        assert_eq!(detect_tokens("Wednesday.mkv"), None);
        assert_eq!(detect_tokens("Movie.12160p.mkv"), None);
        assert_eq!(detect_tokens("Foo.mkv"), None);
    }

    #[test]
    fn test_higher_tier_wins() {
        assert_eq!(detect_tokens("Movie.HD.2160p.mkv"), Some(QualityTier::Uhd2160));
    }

    #[test]
    fn test_metadata_beats_path() {
        let classifier = QualityClassifier::default();
        let signals = metadata("Bluray-2160p", "/movies/Foo 720p/Foo.720p.mkv");
        assert_eq!(classifier.classify(&signals), QualityTier::Uhd2160);
    }

    #[test]
    fn test_unknown_metadata_falls_through() {
        let classifier = QualityClassifier::default();
        let signals = metadata("Unknown", "/media/movies/Foo/Foo.720p.mkv");
        assert_eq!(classifier.classify(&signals), QualityTier::Hd720);
    }

    #[test]
    fn test_unmapped_metadata_uses_tokens() {
        let classifier = QualityClassifier::default();
        let signals = metadata("Bluray-2160p HDR", "/movies/Foo/Foo.mkv");
        assert_eq!(classifier.classify(&signals), QualityTier::Uhd2160);
    }

    #[test]
    fn test_folder_marker() {
        let classifier = QualityClassifier::new(["/big-screen/"]);
        let signals = metadata("Unknown", "/media/Big-Screen/Foo/Foo.mkv");
        assert_eq!(classifier.classify(&signals), QualityTier::Uhd2160);
    }

    #[test]
    fn test_empty_signals_default() {
        let classifier = QualityClassifier::default();
        assert_eq!(classifier.classify(&QualitySignals::default()), QualityTier::FullHd1080);
        assert_eq!(classifier.classify(&metadata("", "")), QualityTier::FullHd1080);
    }
}
