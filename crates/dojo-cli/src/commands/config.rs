use std::path::{Path, PathBuf};

use clap::Subcommand;
use dojo_core::storage::DocumentsConfig;
use dojo_core::Config;
use serde::Serialize;

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dot-separated key, e.g. "checkin.admission_lead_minutes"
        key: String,
    },
    /// Change one setting and save
    Set {
        key: String,
        value: String,
    },
    /// Show the config file location, its settings and document status
    List,
    /// Restore the default kiosk settings
    Reset,
}

/// A configured document and whether the kiosk can read it.
#[derive(Serialize)]
struct DocumentStatus {
    path: PathBuf,
    found: bool,
}

impl DocumentStatus {
    fn of(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            found: path.is_file(),
        }
    }
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    file: PathBuf,
    settings: &'a Config,
    schedule: DocumentStatus,
    roster: DocumentStatus,
}

/// Refuse to point the kiosk at a document that isn't there; the next
/// start would only show the load failure message.
fn check_documents(documents: &DocumentsConfig) -> Result<(), Box<dyn std::error::Error>> {
    for path in [&documents.schedule_path, &documents.roster_path] {
        if !path.is_file() {
            return Err(format!("document not found: {}", path.display()).into());
        }
    }
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            if key.starts_with("documents.") {
                check_documents(&config.documents)?;
            }
            config.save()?;
            tracing::debug!(%key, %value, "config updated");
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            print_json(&ConfigReport {
                file: Config::path()?,
                settings: &config,
                schedule: DocumentStatus::of(&config.documents.schedule_path),
                roster: DocumentStatus::of(&config.documents.roster_path),
            })?;
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
