//! Error types for the combiner.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the combiner.
#[derive(Error, Debug)]
pub enum Error {
    // Relocation errors
    #[error("Source file does not exist: {0}")]
    SourceNotFound(String),

    #[error("Could not determine source root folder for: {0}")]
    NoMatchingRoot(String),

    #[error("No main library root folders found")]
    NoDestinationRoot,

    #[error("No free destination name for {path} after {attempts} attempts")]
    DestinationCollisionUnresolvable { path: String, attempts: u32 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to {operation} {path}: {source}")]
    Filesystem {
        operation: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Missing required configuration: {0}")]
    ConfigMissing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Catalog errors
    #[error("Catalog request failed: {0}")]
    Catalog(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Coarse error classification reported in relocation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    SourceNotFound,
    NoMatchingRoot,
    NoDestinationRoot,
    DestinationCollisionUnresolvable,
    PermissionDenied,
    FilesystemError,
    Configuration,
    Catalog,
    Other,
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Wrap an IO failure on `path`, keeping permission failures distinct.
    pub fn fs(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return Error::PermissionDenied(format!(
                "cannot {} {}: {}",
                operation,
                path.display(),
                source
            ));
        }
        Error::Filesystem {
            operation,
            path: path.display().to_string(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceNotFound(_) => ErrorKind::SourceNotFound,
            Error::NoMatchingRoot(_) => ErrorKind::NoMatchingRoot,
            Error::NoDestinationRoot => ErrorKind::NoDestinationRoot,
            Error::DestinationCollisionUnresolvable { .. } => {
                ErrorKind::DestinationCollisionUnresolvable
            }
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::Filesystem { .. } => ErrorKind::FilesystemError,
            Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ErrorKind::PermissionDenied
            }
            Error::Io(_) => ErrorKind::FilesystemError,
            Error::ConfigMissing(_) | Error::InvalidConfig(_) | Error::Toml(_) => {
                ErrorKind::Configuration
            }
            Error::Catalog(_) | Error::Http(_) => ErrorKind::Catalog,
            Error::Json(_) | Error::Other(_) => ErrorKind::Other,
        }
    }
}
