//! Configuration management for whoshome.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "whoshome";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "members.db";

/// Default remote table name.
const DEFAULT_TABLE: &str = "FamilyMembers";

/// Placeholder shown instead of secrets.
const REDACTED: &str = "********";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WHOSHOME_`, `__` between sections)
/// 2. TOML config file at `~/.config/whoshome/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,
    /// Terminal display configuration.
    pub display: DisplayConfig,
}

/// Which store implementation holds the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hosted PostgREST/Supabase table.
    Rest,
    /// Local `SQLite` file.
    #[default]
    Sqlite,
    /// Process memory; nothing survives the session.
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Store-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to use.
    pub backend: Backend,
    /// Path to the `SQLite` database file.
    /// Defaults to `~/.local/share/whoshome/members.db`
    pub database_path: Option<PathBuf>,
    /// Project URL of the hosted store, e.g. `https://xyz.supabase.co`.
    pub url: Option<String>,
    /// API key of the hosted store.
    pub api_key: Option<String>,
    /// Table name on the hosted store.
    pub table: String,
    /// Request timeout for the hosted store, in seconds.
    pub timeout_secs: u64,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Paint member initials with their colour using ANSI escapes.
    pub ansi_colors: bool,
    /// Width of the status bar, in cells.
    pub bar_width: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            database_path: None, // Resolved at runtime
            url: None,
            api_key: None,
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            ansi_colors: true,
            bar_width: 20,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("WHOSHOME_").split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == Backend::Rest {
            if self.store.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                return Err(Error::config_validation(
                    "store.url is required for the rest backend",
                ));
            }
            if self
                .store
                .api_key
                .as_deref()
                .map_or(true, |k| k.trim().is_empty())
            {
                return Err(Error::config_validation(
                    "store.api_key is required for the rest backend",
                ));
            }
        }

        if self.store.table.trim().is_empty() {
            return Err(Error::config_validation("store.table must not be empty"));
        }

        if self.store.timeout_secs == 0 {
            return Err(Error::config_validation(
                "store.timeout_secs must be greater than 0",
            ));
        }

        if !(4..=80).contains(&self.display.bar_width) {
            return Err(Error::config_validation(format!(
                "display.bar_width ({}) must be between 4 and 80",
                self.display.bar_width
            )));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_secs)
    }

    /// A copy safe to print: the API key is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.store.api_key.is_some() {
            config.store.api_key = Some(REDACTED.to_string());
        }
        config
    }
}
