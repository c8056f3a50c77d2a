//! Server configuration
//!
//! Built-in defaults, then the TOML file named by `CATALOGUE_CONFIG`, then
//! the `CATALOGUE_ADDR` and `CATALOGUE_DB` environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalogue_core::filters::DEFAULT_PAGE_SIZE;
use catalogue_core::DatabaseConfig;

pub const CONFIG_ENV: &str = "CATALOGUE_CONFIG";
pub const ADDR_ENV: &str = "CATALOGUE_ADDR";
pub const DB_ENV: &str = "CATALOGUE_DB";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A bearer token and the permission codes it carries, e.g. `knownitems:read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    /// Page size for listings that do not ask for one
    pub default_page_size: i64,
    pub database: DatabaseConfig,
    pub tokens: Vec<TokenGrant>,
    /// Origins allowed to make cross-origin requests. Empty disables CORS.
    pub cors_trusted_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:4000".to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            database: DatabaseConfig::default(),
            tokens: Vec::new(),
            cors_trusted_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(addr) = lookup(ADDR_ENV) {
            config.addr = addr;
        }
        if let Some(db) = lookup(DB_ENV) {
            config.database.path = PathBuf::from(db);
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
