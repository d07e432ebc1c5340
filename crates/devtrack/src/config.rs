//! Configuration file loading and parsing.
//!
//! devtrack reads optional settings from `devtrack.toml` in the data
//! directory. A missing file or missing section falls back to defaults, and
//! `DEVTRACK_DEBOUNCE_MS` overrides the debounce interval.

use crate::storage::{validate_key, DEFAULT_STORAGE_KEY};
use crate::store::{StoreOptions, DEFAULT_DEBOUNCE};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "devtrack.toml";

/// Data directory used when neither `--data-dir` nor the environment names one.
pub const DEFAULT_DATA_DIR: &str = ".devtrack";

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "DEVTRACK_DATA_DIR";

/// Environment variable overriding `persistence.debounce_ms`.
pub const DEBOUNCE_ENV: &str = "DEVTRACK_DEBOUNCE_MS";

/// Root configuration structure loaded from `devtrack.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevtrackConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Slot name; the collection lives in `<data_dir>/<key>.json`.
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { key: default_key() }
    }
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// `[persistence]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistenceConfig {
    /// Quiet interval before a pending write is flushed, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl DevtrackConfig {
    /// Load `devtrack.toml` from `data_dir`, or defaults if it does not exist.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DevtrackConfig = toml::from_str(content)?;
        validate_key(&config.storage.key)?;
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_debounce_override(env::var(DEBOUNCE_ENV).ok().as_deref())
    }

    /// Apply a debounce override given as milliseconds text.
    pub fn with_debounce_override(mut self, value: Option<&str>) -> Result<Self> {
        if let Some(value) = value {
            self.persistence.debounce_ms = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {:?}", DEBOUNCE_ENV, value))?;
        }
        Ok(self)
    }

    /// Store options derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            key: self.storage.key.clone(),
            debounce: Duration::from_millis(self.persistence.debounce_ms),
        }
    }
}

/// Resolve the data directory: explicit flag, then environment, then default.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
