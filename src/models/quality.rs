//! Quality tier model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized quality bucket used in filename suffixes.
///
/// Variants are declared from lowest to highest resolution so the derived
/// ordering sorts by resolution.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum QualityTier {
    #[serde(rename = "480p")]
    Sd480,
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    FullHd1080,
    #[serde(rename = "2160p")]
    Uhd2160,
}

impl QualityTier {
    /// All tiers, highest resolution first.
    pub const ALL: [QualityTier; 4] = [
        QualityTier::Uhd2160,
        QualityTier::FullHd1080,
        QualityTier::Hd720,
        QualityTier::Sd480,
    ];

    /// Canonical suffix label.
    pub fn label(self) -> &'static str {
        match self {
            QualityTier::Uhd2160 => "2160p",
            QualityTier::FullHd1080 => "1080p",
            QualityTier::Hd720 => "720p",
            QualityTier::Sd480 => "480p",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityTier {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityTier::ALL
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::other(format!("Unknown quality tier: {}", s)))
    }
}

/// Everything known about an incoming file's quality.
///
/// Classification consults the fields in a fixed priority order; any of
/// them may be missing.
#[derive(Debug, Clone, Default)]
pub struct QualitySignals {
    /// Quality name from the upstream metadata (e.g. "Bluray-2160p").
    pub metadata_name: Option<String>,
    /// Full path of the file.
    pub full_path: Option<String>,
    /// Path relative to the library root.
    pub relative_path: Option<String>,
    /// Bare filename.
    pub filename: Option<String>,
}

impl QualitySignals {
    /// Signals for a file that only has a name (e.g. an existing sibling).
    pub fn from_filename(filename: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            ..Default::default()
        }
    }
}
