//! Catalog Configuration
//!
//! Loaded from a TOML file; every field has a default so an absent file
//! yields a working local setup pointed at the standard API address.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "ASSET_CATALOG_CONFIG";
/// Env var overriding `base_url`
pub const BASE_URL_ENV: &str = "ASSET_CATALOG_BASE_URL";
/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "asset-catalog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Which backend the catalog talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// REST server at `base_url`
    #[default]
    Remote,
    /// In-memory demo data, nothing leaves the process
    Local,
}

/// What happens to an optimistic reassignment when the remote update fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReassignFailurePolicy {
    /// Leave the new category in place and only report the failure
    #[default]
    Keep,
    /// Put the item back where it was, unless it moved again meanwhile
    Revert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub mode: BackendMode,
    pub base_url: String,
    pub session_timeout_secs: u64,
    pub reassign_failure: ReassignFailurePolicy,
    /// Marker file holding the persisted "authenticated" flag
    pub session_file: PathBuf,
    pub log_dir: PathBuf,
    pub log_max_bytes: u64,
    pub log_max_files: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Remote,
            base_url: "http://localhost:5000/api".to_string(),
            session_timeout_secs: 15 * 60,
            reassign_failure: ReassignFailurePolicy::Keep,
            session_file: PathBuf::from(".asset-catalog/session"),
            log_dir: PathBuf::from(".asset-catalog/logs"),
            log_max_bytes: 1024 * 1024,
            log_max_files: 5,
        }
    }
}

impl CatalogConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from `ASSET_CATALOG_CONFIG` (or the default file) and apply env overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::load(&path)?;
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        Ok(config)
    }
}
