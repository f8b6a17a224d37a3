mod config;
pub mod database;
pub mod migrations;

pub use config::{AchievementsConfig, Config, GoalsConfig, LoggingConfig};
pub use database::{Database, StoredEvent};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `WATTQUEST_DATA_DIR` wins when set. Otherwise the directory is
/// `~/.config/wattquest[-dev]/`, with the `-dev` suffix selected by
/// `WATTQUEST_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WATTQUEST_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WATTQUEST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("wattquest-dev")
            } else {
                base_dir.join("wattquest")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
