//! Catalog webhook payload.
//!
//! Only the fields the download pipeline reads are modelled; everything
//! else in the payload is ignored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Event type that triggers a relocation.
pub const DOWNLOAD_EVENT: &str = "Download";

/// Webhook body sent by the 4K catalog instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub movie: Option<WebhookMovie>,
    #[serde(default)]
    pub movie_file: Option<WebhookMovieFile>,
}

impl WebhookPayload {
    /// Event type, or "unknown" when absent.
    pub fn event_type(&self) -> &str {
        self.event_type.as_deref().unwrap_or("unknown")
    }

    /// Whether this event should trigger a relocation.
    pub fn is_download(&self) -> bool {
        self.event_type.as_deref() == Some(DOWNLOAD_EVENT)
    }
}

/// Movie section of the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMovie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub folder_path: Option<String>,
}

impl WebhookMovie {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown")
    }
}

/// Movie file section of the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMovieFile {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub relative_path: Option<String>,
    #[serde(default)]
    pub quality: Option<WebhookQuality>,
}

/// Nested `quality.quality.name` structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookQuality {
    #[serde(default)]
    pub quality: Option<WebhookQualityName>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookQualityName {
    #[serde(default)]
    pub name: Option<String>,
}

impl WebhookMovieFile {
    /// Quality name from the metadata, if present.
    pub fn quality_name(&self) -> Option<&str> {
        self.quality
            .as_ref()
            .and_then(|q| q.quality.as_ref())
            .and_then(|q| q.name.as_deref())
    }

    /// Absolute path of the file, falling back to the movie folder joined
    /// with the relative path.
    pub fn resolve_path(&self, movie: &WebhookMovie) -> Option<PathBuf> {
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        match (movie.folder_path.as_deref(), self.relative_path.as_deref()) {
            (Some(folder), Some(relative)) if !folder.is_empty() && !relative.is_empty() => {
                Some(PathBuf::from(folder).join(relative))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "eventType": "Download",
        "movie": {"id": 42, "title": "Heat", "year": 1995, "tmdbId": 949, "folderPath": "/uhd/Heat (1995)"},
        "movieFile": {
            "relativePath": "Heat (1995).mkv",
            "path": "/uhd/Heat (1995)/Heat (1995).mkv",
            "quality": {"quality": {"id": 19, "name": "Bluray-2160p"}, "revision": {"version": 1}}
        },
        "isUpgrade": false
    }"#;

    #[test]
    fn test_parse_download_payload() {
        let payload: WebhookPayload = serde_json::from_str(SAMPLE).unwrap();
        assert!(payload.is_download());

        let movie = payload.movie.unwrap();
        assert_eq!(movie.id, 42);
        assert_eq!(movie.tmdb_id, Some(949));

        let file = payload.movie_file.unwrap();
        assert_eq!(file.quality_name(), Some("Bluray-2160p"));
        assert_eq!(
            file.resolve_path(&movie),
            Some(PathBuf::from("/uhd/Heat (1995)/Heat (1995).mkv"))
        );
    }

    #[test]
    fn test_resolve_path_from_folder() {
        let movie = WebhookMovie {
            id: 1,
            folder_path: Some("/uhd/Alien (1979)".to_string()),
            ..Default::default()
        };
        let file = WebhookMovieFile {
            relative_path: Some("Alien.mkv".to_string()),
            ..Default::default()
        };
        assert_eq!(
            file.resolve_path(&movie),
            Some(PathBuf::from("/uhd/Alien (1979)/Alien.mkv"))
        );
    }

    #[test]
    fn test_non_download_event() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"eventType": "Test"}"#).unwrap();
        assert!(!payload.is_download());
        assert_eq!(payload.event_type(), "Test");
    }
}
