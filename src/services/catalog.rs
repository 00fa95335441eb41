//! Catalog (Radarr v3 API) client.
//!
//! One client per catalog instance. Requests authenticate with the
//! `X-Api-Key` header.

use crate::models::config::CatalogInstanceConfig;
use crate::models::relocation::RootFolder;
use crate::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Movie record as returned by the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Import exclusion entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub tmdb_id: i64,
    #[serde(default)]
    pub movie_title: Option<String>,
    #[serde(default)]
    pub movie_year: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RootFolderResponse {
    #[serde(default)]
    name: Option<String>,
    path: PathBuf,
}

/// Operations the download pipeline needs from a catalog instance.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Configured library root folders.
    async fn list_root_folders(&self) -> Result<Vec<RootFolder>>;

    /// Fetch a movie record; `None` if it does not exist.
    async fn get_record(&self, id: i64) -> Result<Option<CatalogRecord>>;

    /// Delete a movie record, keeping its files on disk.
    async fn delete_record(&self, id: i64) -> Result<()>;

    /// Import exclusions.
    async fn list_suppressions(&self) -> Result<Vec<SuppressionEntry>>;

    /// Add an import exclusion.
    async fn add_suppression(&self, tmdb_id: i64, title: &str, year: Option<u32>) -> Result<()>;

    /// Whether the instance answers with the configured key.
    async fn check_connection(&self) -> bool;

    /// Base URL, for logging.
    fn base_url(&self) -> &str;
}

/// HTTP client for one catalog instance.
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Create a client from instance configuration.
    pub fn from_config(config: &CatalogInstanceConfig, timeout_secs: u64) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| crate::Error::ConfigMissing("catalog url".to_string()))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| crate::Error::ConfigMissing("catalog api_key".to_string()))?;
        Self::new(url, api_key, timeout_secs)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3/{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let resp = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let resp = ensure_success(resp, &url)?;
        Ok(resp.json().await?)
    }
}

fn ensure_success(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        return Err(crate::Error::Catalog(format!("{} returned {}", url, status)));
    }
    Ok(resp)
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_root_folders(&self) -> Result<Vec<RootFolder>> {
        let folders: Vec<RootFolderResponse> = self.get_json("rootfolder").await?;
        Ok(folders
            .into_iter()
            .map(|f| {
                let name = f
                    .name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| f.path.display().to_string());
                RootFolder { name, path: f.path }
            })
            .collect())
    }

    async fn get_record(&self, id: i64) -> Result<Option<CatalogRecord>> {
        let url = self.url(&format!("movie/{}", id));
        let resp = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp, &url)?;
        Ok(Some(resp.json().await?))
    }

    async fn delete_record(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("movie/{}", id));
        let resp = self
            .client
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("deleteFiles", "false"), ("addImportExclusion", "false")])
            .send()
            .await?;
        ensure_success(resp, &url)?;
        tracing::info!("Removed movie ID {} from {}", id, self.base_url);
        Ok(())
    }

    async fn list_suppressions(&self) -> Result<Vec<SuppressionEntry>> {
        self.get_json("exclusions").await
    }

    async fn add_suppression(&self, tmdb_id: i64, title: &str, year: Option<u32>) -> Result<()> {
        let url = self.url("exclusions");
        let entry = SuppressionEntry {
            id: None,
            tmdb_id,
            movie_title: Some(title.to_string()),
            movie_year: year,
        };
        let resp = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&entry)
            .send()
            .await?;
        ensure_success(resp, &url)?;
        tracing::info!("Added import exclusion for tmdb {} ({})", tmdb_id, title);
        Ok(())
    }

    async fn check_connection(&self) -> bool {
        match self.get_json::<serde_json::Value>("system/status").await {
            Ok(_) => {
                tracing::info!("Connected to catalog at {}", self.base_url);
                true
            }
            Err(e) => {
                tracing::error!("Failed to connect to catalog at {}: {}", self.base_url, e);
                false
            }
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = CatalogClient::new("http://radarr:7878/", "key", 5).unwrap();
        assert_eq!(client.base_url(), "http://radarr:7878");
        assert_eq!(client.url("rootfolder"), "http://radarr:7878/api/v3/rootfolder");
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = CatalogInstanceConfig {
            url: None,
            api_key: Some("key".to_string()),
        };
        assert!(CatalogClient::from_config(&config, 5).is_err());
    }

    #[test]
    fn test_suppression_serializes_camel_case() {
        let entry = SuppressionEntry {
            id: None,
            tmdb_id: 949,
            movie_title: Some("Heat".to_string()),
            movie_year: Some(1995),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["tmdbId"], 949);
        assert_eq!(json["movieTitle"], "Heat");
        assert_eq!(json["movieYear"], 1995);
    }

    #[test]
    fn test_record_deserializes() {
        let record: CatalogRecord =
            serde_json::from_str(r#"{"id": 3, "title": "Heat", "year": 1995, "tmdbId": 949, "monitored": true}"#)
                .unwrap();
        assert_eq!(record.tmdb_id, Some(949));
    }
}
