//! Server configuration, read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DATA_DIR_VAR: &str = "VEGETABLE_CATALOG_DATA_DIR";
pub const BIND_VAR: &str = "VEGETABLE_CATALOG_BIND";
pub const ADMIN_USER_VAR: &str = "VEGETABLE_CATALOG_ADMIN_USER";
pub const ADMIN_PASSWORD_VAR: &str = "VEGETABLE_CATALOG_ADMIN_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {source}")]
    InvalidBind {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite database file
    pub data_dir: PathBuf,
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// Bootstrap superuser, created on startup if missing
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir().join("vegetable-catalog"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup(BIND_VAR) {
            config.bind_addr = bind.parse().map_err(|source| ConfigError::InvalidBind {
                value: bind.clone(),
                source,
            })?;
        }
        if let Some(user) = lookup(ADMIN_USER_VAR) {
            config.admin_username = user;
        }
        if let Some(password) = lookup(ADMIN_PASSWORD_VAR) {
            config.admin_password = password;
        }

        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("catalog.db")
    }
}
