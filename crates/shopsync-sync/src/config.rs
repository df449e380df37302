//! # Sync Configuration
//!
//! Configuration management for the sync layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPSYNC_API_URL=https://example.com/wp-json                       │
//! │     SHOPSYNC_SITE_IDS=7,12                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopsync/shopsync.toml (Linux)                           │
//! │     ~/Library/Application Support/com.shopsync.shopsync/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://public-api.wordpress.com"
//! timeout_secs = 30
//!
//! [sync]
//! page_size = 25
//! max_pages = 200
//! site_ids = [7, 12]
//!
//! [database]
//! path = "/var/lib/shopsync/shopsync.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use shopsync_core::validation::{validate_api_url, validate_max_pages, validate_page_size, validate_site_id};
use shopsync_core::{SiteId, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};

use crate::error::{SyncError, SyncResult};
use crate::synchronizer::Paging;

const CONFIG_FILE_NAME: &str = "shopsync.toml";
const DATABASE_FILE_NAME: &str = "shopsync.db";

// =============================================================================
// API Settings
// =============================================================================

/// REST API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every `/sites/{id}/...` path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://public-api.wordpress.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("shopsync/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiSettings {
    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Sync behavior settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// `per_page` used when walking paginated collections.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Largest number of pages one synchronization may walk.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Sites synchronized when no site is given explicitly.
    #[serde(default)]
    pub site_ids: Vec<i64>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

impl SyncSettings {
    /// Paging used by the paginated collections.
    pub fn paging(&self) -> Paging {
        Paging::Paged {
            page_size: self.page_size,
            max_pages: self.max_pages,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            site_ids: Vec::new(),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// Local store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// REST API settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Sync behavior settings.
    #[serde(default)]
    pub sync: SyncSettings,

    /// Local store settings.
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl SyncConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shopsync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a config file without applying overrides or validation.
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// Normalizes the base URL (surrounding whitespace and trailing slashes
    /// removed) on success.
    pub fn validate(&mut self) -> SyncResult<()> {
        self.api.base_url = validate_api_url(&self.api.base_url)
            .map_err(|e| SyncError::InvalidUrl(e.to_string()))?;

        if self.api.timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        validate_page_size(self.sync.page_size)
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
        validate_max_pages(self.sync.max_pages)
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        for site_id in &self.sync.site_ids {
            validate_site_id(*site_id).map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SHOPSYNC_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(path) = lookup("SHOPSYNC_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(ids) = lookup("SHOPSYNC_SITE_IDS") {
            let parsed: Result<Vec<i64>, _> = ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::parse::<i64>)
                .collect();
            match parsed {
                Ok(site_ids) => self.sync.site_ids = site_ids,
                Err(_) => warn!(value = %ids, "Ignoring malformed SHOPSYNC_SITE_IDS"),
            }
        }

        if let Some(size) = lookup("SHOPSYNC_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(size) => self.sync.page_size = size,
                Err(_) => warn!(value = %size, "Ignoring malformed SHOPSYNC_PAGE_SIZE"),
            }
        }

        if let Some(pages) = lookup("SHOPSYNC_MAX_PAGES") {
            match pages.parse::<u32>() {
                Ok(pages) => self.sync.max_pages = pages,
                Err(_) => warn!(value = %pages, "Ignoring malformed SHOPSYNC_MAX_PAGES"),
            }
        }

        if let Some(timeout) = lookup("SHOPSYNC_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.api.timeout_secs = secs;
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopsync", "shopsync")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the configured sites.
    pub fn site_ids(&self) -> Vec<SiteId> {
        self.sync.site_ids.iter().copied().map(SiteId::new).collect()
    }

    /// Returns the database file, falling back to the platform data directory
    /// and finally to the working directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "shopsync", "shopsync")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let mut config = SyncConfig::default();
        assert_eq!(config.sync.page_size, 25);
        assert_eq!(config.sync.max_pages, 200);
        assert_eq!(
            config.sync.paging(),
            Paging::Paged {
                page_size: 25,
                max_pages: 200
            }
        );
        assert!(config.site_ids().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.api.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));

        config.api.base_url = "https://example.com/wp-json/".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "https://example.com/wp-json");

        config.sync.page_size = 0;
        assert!(config.validate().unwrap_err().is_config_error());

        config.sync.page_size = 101;
        assert!(config.validate().is_err());

        config.sync.page_size = 100;
        config.sync.max_pages = 0;
        assert!(config.validate().is_err());

        config.sync.max_pages = 1;
        config.sync.site_ids = vec![7, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = SyncConfig::default();
        config.apply_overrides(lookup_from(&[
            ("SHOPSYNC_API_URL", "http://localhost:8080"),
            ("SHOPSYNC_SITE_IDS", "7, 12,"),
            ("SHOPSYNC_PAGE_SIZE", "50"),
            ("SHOPSYNC_MAX_PAGES", "not-a-number"),
            ("SHOPSYNC_DB_PATH", "/tmp/cache.db"),
        ]));

        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.site_ids(), vec![SiteId::new(7), SiteId::new(12)]);
        assert_eq!(config.sync.page_size, 50);
        assert_eq!(config.sync.max_pages, 200);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/cache.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopsync.toml");
        std::fs::write(&path, "[sync]\nsite_ids = [3]\n").unwrap();

        let config = SyncConfig::from_file(&path).unwrap();
        assert_eq!(config.sync.site_ids, vec![3]);
        assert_eq!(config.sync.page_size, 25);
        assert_eq!(config.api, ApiSettings::default());
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shopsync.toml");

        let mut config = SyncConfig::default();
        config.sync.site_ids = vec![7];
        config.database.path = Some(PathBuf::from("/tmp/x.db"));
        config.save(Some(path.clone())).unwrap();

        assert_eq!(SyncConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopsync.toml");
        std::fs::write(&path, "[sync\npage_size = ").unwrap();

        let err = SyncConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, SyncError::ConfigLoadFailed(_)));
    }
}
