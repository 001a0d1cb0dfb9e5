//! Current session pointer.
//!
//! Records which student is signed in on this kiosk so the schedule can
//! mark classes they already joined. Malformed stored data reads as "no
//! session".

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};
use crate::roster::Student;
use crate::storage::Database;

/// Local storage key holding the session pointer.
pub const SESSION_KEY: &str = "taskkarate_user";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPointer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionPointer {
    pub fn for_student(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: Some(student.name.clone()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Reads and writes the session pointer in local storage.
pub struct SessionStore<'a> {
    db: &'a Database,
}

impl<'a> SessionStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn current(&self) -> Result<Option<SessionPointer>> {
        let Some(raw) = self.db.kv_get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<SessionPointer>(&raw) {
            Ok(pointer) => Ok(Some(pointer)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable session pointer");
                Ok(None)
            }
        }
    }

    pub fn sign_in(&self, student: &Student) -> Result<SessionPointer> {
        let pointer = SessionPointer::for_student(student);
        let raw = serde_json::to_string(&pointer).map_err(|source| StorageError::Encode {
            key: SESSION_KEY.to_string(),
            source,
        })?;
        self.db.kv_set(SESSION_KEY, &raw)?;
        tracing::debug!(student = %pointer.id, "session started");
        Ok(pointer)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.db.kv_remove(SESSION_KEY)?;
        Ok(())
    }
}
