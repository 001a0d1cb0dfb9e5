mod config;
pub mod database;

pub use config::{CheckinSettings, Config, DocumentsConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns the data directory.
///
/// `DOJO_HOME` wins when set. Otherwise `~/.config/dojo-hub/`, or
/// `~/.config/dojo-hub-dev/` when `DOJO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = match std::env::var_os("DOJO_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("DOJO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("dojo-hub-dev")
            } else {
                base_dir.join("dojo-hub")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
