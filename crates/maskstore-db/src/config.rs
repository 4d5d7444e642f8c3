//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! ```text
//! MASKSTORE_DB_PATH                ./maskstore.db
//! MASKSTORE_DB_MAX_CONNECTIONS     5
//! MASKSTORE_DB_BUSY_TIMEOUT_MS     5000
//! MASKSTORE_SEARCH_DEFAULT_LIMIT   10
//! MASKSTORE_SEARCH_MAX_LIMIT       100
//! MASKSTORE_TOP_SPENDERS_MAX       100
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use maskstore_core::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT, MAX_TOP_N};

use crate::pool::DbConfig;

/// Limits the query, search and analytics engines enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Page size when a search names none.
    pub search_default_limit: u32,
    /// Largest page a search may ask for.
    pub search_max_limit: u32,
    /// Largest `top_n` for the top-spenders report.
    pub top_spenders_max: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            search_default_limit: DEFAULT_SEARCH_LIMIT,
            search_max_limit: MAX_SEARCH_LIMIT,
            top_spenders_max: MAX_TOP_N,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits on a locked database before giving up
    pub busy_timeout_ms: u64,

    pub engine: EngineSettings,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = StoreConfig {
            database_path: lookup("MASKSTORE_DB_PATH").unwrap_or_else(|| "./maskstore.db".to_string()),

            max_connections: parse_or(&lookup, "MASKSTORE_DB_MAX_CONNECTIONS", 5)?,

            busy_timeout_ms: parse_or(&lookup, "MASKSTORE_DB_BUSY_TIMEOUT_MS", 5000)?,

            engine: EngineSettings {
                search_default_limit: parse_or(&lookup, "MASKSTORE_SEARCH_DEFAULT_LIMIT", DEFAULT_SEARCH_LIMIT)?,
                search_max_limit: parse_or(&lookup, "MASKSTORE_SEARCH_MAX_LIMIT", MAX_SEARCH_LIMIT)?,
                top_spenders_max: parse_or(&lookup, "MASKSTORE_TOP_SPENDERS_MAX", MAX_TOP_N)?,
            },
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("MASKSTORE_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.engine.search_default_limit == 0
            || config.engine.search_default_limit > config.engine.search_max_limit
        {
            return Err(ConfigError::InvalidValue("MASKSTORE_SEARCH_DEFAULT_LIMIT".to_string()));
        }
        if config.engine.top_spenders_max == 0 {
            return Err(ConfigError::InvalidValue("MASKSTORE_TOP_SPENDERS_MAX".to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
