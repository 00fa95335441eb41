//! Configuration model.
//!
//! Values come from `<config_dir>/config.toml` and are then overridden by
//! environment variables:
//! - `RADARR_MAIN_URL`, `RADARR_MAIN_API_KEY`: main catalog instance
//! - `RADARR_4K_URL`, `RADARR_4K_API_KEY`: 4K catalog instance
//! - `ENABLE_PLEX_NAMING`, `PLEX_QUALITY_SUFFIX`, `APPEND_TO_ORIGINAL_NAME`: naming
//! - `COMBINER_HOST`, `COMBINER_PORT`: webhook server bind address

use crate::models::relocation::NamingPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at the configuration directory.
pub const CONFIG_DIR_ENV: &str = "COMBINER_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "combiner.log";
const CONTAINER_CONFIG_DIR: &str = "/config";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog instances.
    pub catalog: CatalogConfig,
    /// Naming behaviour.
    pub naming: NamingConfig,
    /// Quality classifier tuning.
    pub classifier: ClassifierConfig,
    /// File move behaviour.
    pub relocation: RelocationConfig,
    /// Webhook server.
    pub server: ServerConfig,
    /// Directory holding config.toml and the log file.
    #[serde(skip)]
    pub config_dir: PathBuf,
}

/// Both catalog instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub main: CatalogInstanceConfig,
    pub uhd: CatalogInstanceConfig,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Connection settings for one catalog instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogInstanceConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

/// Naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Plex multi-version naming.
    pub enabled: bool,
    /// Add a " - <tier>" suffix when naming is enabled.
    pub add_quality_suffix: bool,
    /// Keep the incoming file's stem instead of the folder name.
    pub append_to_original_name: bool,
}

/// Classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path substrings that mark a 4K library folder.
    pub uhd_folder_markers: Vec<String>,
}

/// Relocation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocationConfig {
    /// Verify cross-volume copies with a checksum before deleting the source.
    pub verify_copies: bool,
    /// Upper bound for " (N)" disambiguation.
    pub max_collision_attempts: u32,
}

/// Webhook server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            main: CatalogInstanceConfig::default(),
            uhd: CatalogInstanceConfig::default(),
            timeout_secs: 30,
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            add_quality_suffix: true,
            append_to_original_name: true,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            uhd_folder_markers: vec!["/uhd-movies/".to_string(), "/4k".to_string()],
        }
    }
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            verify_copies: true,
            max_collision_attempts: 1000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5465,
        }
    }
}

impl NamingConfig {
    /// Policy handed to the relocator.
    pub fn policy(&self) -> NamingPolicy {
        NamingPolicy {
            enable_quality_suffix: self.enabled && self.add_quality_suffix,
            append_to_original_name: self.append_to_original_name,
        }
    }
}

impl Config {
    /// Path of the log file.
    pub fn log_file_path(&self) -> PathBuf {
        log_file_in(&self.config_dir)
    }

    /// Create the configuration directory.
    pub fn ensure_config_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RADARR_MAIN_URL") {
            self.catalog.main.url = Some(v);
        }
        if let Some(v) = lookup("RADARR_MAIN_API_KEY") {
            self.catalog.main.api_key = Some(v);
        }
        if let Some(v) = lookup("RADARR_4K_URL") {
            self.catalog.uhd.url = Some(v);
        }
        if let Some(v) = lookup("RADARR_4K_API_KEY") {
            self.catalog.uhd.api_key = Some(v);
        }
        if let Some(v) = lookup("ENABLE_PLEX_NAMING") {
            self.naming.enabled = parse_flag(&v);
        }
        if let Some(v) = lookup("PLEX_QUALITY_SUFFIX") {
            self.naming.add_quality_suffix = parse_flag(&v);
        }
        if let Some(v) = lookup("APPEND_TO_ORIGINAL_NAME") {
            self.naming.append_to_original_name = parse_flag(&v);
        }
        if let Some(v) = lookup("COMBINER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("COMBINER_PORT") {
            self.server.port = v.trim().parse().map_err(|_| {
                crate::Error::InvalidConfig(format!("COMBINER_PORT is not a port: {}", v))
            })?;
        }
        Ok(())
    }

    /// Check that both catalog instances are fully configured.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("RADARR_MAIN_URL", &self.catalog.main.url),
            ("RADARR_MAIN_API_KEY", &self.catalog.main.api_key),
            ("RADARR_4K_URL", &self.catalog.uhd.url),
            ("RADARR_4K_API_KEY", &self.catalog.uhd.api_key),
        ];

        let missing: Vec<_> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(crate::Error::ConfigMissing(missing.join(", ")));
        }
        Ok(())
    }
}

/// Environment booleans are true only when spelled "true".
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Log file location inside `config_dir`.
pub fn log_file_in(config_dir: &Path) -> PathBuf {
    config_dir.join(LOG_FILE_NAME)
}

/// Resolve the configuration directory.
pub fn resolve_config_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let container = PathBuf::from(CONTAINER_CONFIG_DIR);
    if container.is_dir() {
        return container;
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("combiner")
}

/// Load configuration from `config_dir/config.toml` without env overrides.
pub fn load_config_file(config_dir: &Path) -> Result<Config> {
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            crate::Error::InvalidConfig(format!("{}: {}", config_path.display(), e))
        })?;
        tracing::info!("Loaded configuration from {}", config_path.display());
        config
    } else {
        tracing::info!(
            "Config file not found at {}, using environment variables only",
            config_path.display()
        );
        Config::default()
    };

    config.config_dir = config_dir.to_path_buf();
    Ok(config)
}

/// Load configuration from file and the process environment.
pub fn load_config(explicit_dir: Option<&Path>) -> Result<Config> {
    let config_dir = resolve_config_dir(explicit_dir);
    let mut config = load_config_file(&config_dir)?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5465);
        assert!(!config.naming.enabled);
        assert!(config.naming.add_quality_suffix);
        assert!(config.relocation.verify_copies);
        assert!(!config.naming.policy().enable_quality_suffix);
    }

    #[test]
    fn test_policy_requires_both_flags() {
        let mut naming = NamingConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(naming.policy().enable_quality_suffix);

        naming.add_quality_suffix = false;
        assert!(!naming.policy().enable_quality_suffix);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RADARR_MAIN_URL", "http://main:7878"),
            ("RADARR_4K_API_KEY", "abc"),
            ("ENABLE_PLEX_NAMING", "TRUE"),
            ("PLEX_QUALITY_SUFFIX", "yes"),
            ("COMBINER_PORT", "8080"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.catalog.main.url.as_deref(), Some("http://main:7878"));
        assert_eq!(config.catalog.uhd.api_key.as_deref(), Some("abc"));
        assert!(config.naming.enabled);
        // Anything other than "true" is false.
        assert!(!config.naming.add_quality_suffix);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result =
            config.apply_env_overrides(|k| (k == "COMBINER_PORT").then(|| "nope".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_lists_missing() {
        let mut config = Config::default();
        config.catalog.main.url = Some("http://main".to_string());
        config.catalog.main.api_key = Some("key".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("RADARR_4K_URL"));
        assert!(err.contains("RADARR_4K_API_KEY"));
        assert!(!err.contains("RADARR_MAIN_URL"));
    }
}
