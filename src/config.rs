//! Configuration management for taskdeck.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `DATA_DIR` - Optional. Directory for the SQLite database. Defaults to `./data`.
//! - `TASK_STORE` - Optional. Storage backend (`sqlite` or `memory`). Defaults to `sqlite`.

use crate::api::task_store::TaskStoreType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory holding the SQLite database file
    pub data_dir: PathBuf,

    /// Which task store backend to use
    pub store_type: TaskStoreType,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let store_type = std::env::var("TASK_STORE")
            .map(|s| TaskStoreType::from_str(&s))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            data_dir,
            store_type,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(data_dir: PathBuf, store_type: TaskStoreType) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir,
            store_type,
        }
    }
}
