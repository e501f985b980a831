mod config;
pub mod database;
pub mod migrations;
mod repository;

pub use config::{Config, HabitsConfig};
pub use database::HabitDb;
pub use repository::{HabitRepository, MemoryRepository, StoreSnapshot};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the habitroom data directory, creating it if needed.
///
/// `HABITROOM_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/habitroom`, or `~/.config/habitroom-dev` when `HABITROOM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HABITROOM_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitroom-dev")
            } else {
                base_dir.join("habitroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
