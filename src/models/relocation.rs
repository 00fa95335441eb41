//! Relocation request and outcome models.

use crate::error::{Error, ErrorKind};
use crate::models::quality::QualityTier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A library root folder configured on a catalog instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolder {
    /// Display name (defaults to the path when the catalog has none).
    #[serde(default)]
    pub name: String,
    /// Absolute directory path.
    pub path: PathBuf,
}

impl RootFolder {
    /// Create a root folder named after its path.
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
        }
    }
}

/// How files are named at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingPolicy {
    /// Append a quality suffix and normalize existing siblings.
    pub enable_quality_suffix: bool,
    /// Keep the incoming file's own stem; when false the destination
    /// folder name is used as the stem instead.
    pub append_to_original_name: bool,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            enable_quality_suffix: false,
            append_to_original_name: true,
        }
    }
}

/// Input for a single relocation.
#[derive(Debug, Clone)]
pub struct RelocationRequest {
    pub source_path: PathBuf,
    pub movie_title: String,
    pub movie_year: Option<u32>,
    /// Quality name from the upstream metadata, if any.
    pub raw_quality_hint: Option<String>,
    /// Path relative to the source library root, if the caller knows it.
    pub relative_path: Option<String>,
    pub source_roots: Vec<RootFolder>,
    pub dest_roots: Vec<RootFolder>,
    pub naming_policy: NamingPolicy,
}

impl RelocationRequest {
    /// "Title (Year)" label used in logs.
    pub fn display_title(&self) -> String {
        match self.movie_year {
            Some(year) => format!("{} ({})", self.movie_title, year),
            None => self.movie_title.clone(),
        }
    }
}

/// A file renamed in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub old: String,
    pub new: String,
}

/// What happened to the incoming file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelocationOperation {
    /// The file was moved into the destination library.
    Moved,
    /// The destination already held this very file.
    SkippedExists,
}

/// Why a relocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl From<&Error> for RelocationFailure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

/// Result of one relocation, successful or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationOutcome {
    pub success: bool,
    pub destination_path: Option<PathBuf>,
    pub original_filename: String,
    pub final_filename: Option<String>,
    pub renamed: bool,
    pub quality: Option<QualityTier>,
    pub siblings_renamed: Vec<RenamedFile>,
    pub sibling_errors: Vec<String>,
    /// Non-fatal problems with the move itself, such as a source left behind.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub operation: Option<RelocationOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RelocationFailure>,
}

impl RelocationOutcome {
    /// Kind of the failure, if the relocation failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
