//! Loading the static schedule and roster documents.
//!
//! Both are read once at startup. There is no retry and no partial
//! fallback: if either fails, the caller shows
//! [`DocumentError::USER_MESSAGE`] and stops.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::DocumentError;
use crate::roster::Roster;
use crate::schedule::ScheduleDocument;
use crate::storage::DocumentsConfig;

/// Schedule and roster, loaded together.
#[derive(Debug, Clone, Default)]
pub struct Documents {
    pub schedule: ScheduleDocument,
    pub roster: Roster,
}

impl Documents {
    pub fn load(config: &DocumentsConfig) -> Result<Self, DocumentError> {
        let schedule = load_schedule(&config.schedule_path)?;
        let roster = load_roster(&config.roster_path)?;
        tracing::debug!(students = roster.students.len(), "documents loaded");
        Ok(Self { schedule, roster })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DocumentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_schedule(path: &Path) -> Result<ScheduleDocument, DocumentError> {
    read_json(path)
}

pub fn load_roster(path: &Path) -> Result<Roster, DocumentError> {
    read_json(path)
}
