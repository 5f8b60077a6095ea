//! Runtime configuration
//!
//! Config is resolved in three layers:
//! 1. Built-in defaults
//! 2. Optional TOML file (explicit path, else ~/.config/fintrack/config.toml)
//! 3. Environment variables (`DB_NAME`, `DB_PASSWORD`, `FINTRACK_API_URL`)
//!
//! ```toml
//! [database]
//! path = "finance_tracker.db"
//! password = "correct horse battery staple"
//!
//! [api]
//! base_url = "http://localhost:8080/api"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable naming the database file
pub const DB_NAME_ENV: &str = "DB_NAME";
/// Environment variable holding the database passphrase
pub const DB_PASSWORD_ENV: &str = "DB_PASSWORD";
/// Environment variable overriding the transactions API base URL
pub const API_URL_ENV: &str = "FINTRACK_API_URL";

const DEFAULT_DB_PATH: &str = "finance_tracker.db";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Where and how to open the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: String,
    /// SQLCipher passphrase; `None` opens the database unencrypted
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DB_PATH.to_string(),
            password: None,
        }
    }
}

/// Transactions API used by CSV import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    database: Option<RawDatabase>,
    api: Option<RawApi>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDatabase {
    path: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawApi {
    base_url: Option<String>,
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fintrack").join("config.toml"))
}

impl AppConfig {
    /// Resolve configuration from file and process environment
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let file_content = match explicit_path {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?),
                _ => None,
            },
        };

        let mut config = match file_content {
            Some(content) => Self::from_toml(&content)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;

        let mut config = Self::default();
        if let Some(db) = raw.database {
            if let Some(path) = db.path {
                config.database.path = path;
            }
            config.database.password = db.password.filter(|p| !p.is_empty());
        }
        if let Some(api) = raw.api {
            if let Some(url) = api.base_url {
                config.api.base_url = url;
            }
        }
        Ok(config)
    }

    /// Overlay environment variables; `lookup` abstracts `std::env::var` for tests
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(DB_NAME_ENV).filter(|v| !v.is_empty()) {
            debug!("Database path from {}", DB_NAME_ENV);
            self.database.path = name;
        }
        if let Some(password) = lookup(DB_PASSWORD_ENV).filter(|v| !v.is_empty()) {
            self.database.password = Some(password);
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            debug!("API base URL from {}", API_URL_ENV);
            self.api.base_url = url;
        }
    }
}
