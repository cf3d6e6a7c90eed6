mod config;
mod store;

pub use config::{CloudConfig, Config, FoodApiConfig, TrackingConfig, UiConfig};
pub use store::{DateRangeData, RangeKind, RunDay, Store, UserStatistics};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `HEALTHTRACK_DATA_DIR` wins when set. Otherwise `~/.config/healthtrack/`,
/// or `~/.config/healthtrack-dev/` when `HEALTHTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("HEALTHTRACK_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HEALTHTRACK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("healthtrack-dev")
            } else {
                base_dir.join("healthtrack")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::NoDataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
