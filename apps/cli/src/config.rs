//! CLI configuration.

use std::{env, path::PathBuf};

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Data directory for the local JSON backend. When unset the demo runs
    /// against the in-memory backend and persists nothing.
    pub data_dir: Option<PathBuf>,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("QUICKTASK_DATA_DIR").ok().map(PathBuf::from),
            log_level: env::var("QUICKTASK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
