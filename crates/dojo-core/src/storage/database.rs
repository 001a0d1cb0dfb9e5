//! SQLite-backed local storage.
//!
//! A single key-value table standing in for the kiosk's local storage. The
//! check-in ledger and the session pointer each live under one key as JSON.

use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::{Result, StorageError};
use crate::ledger::{decode_records, encode_records, CheckinRecord, CheckinRepository, CHECKINS_KEY};

const DB_FILE: &str = "dojo.db";

/// Local key-value storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/dojo.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self> {
        let dir = data_dir().map_err(|e| StorageError::DataDir(e.to_string()))?;
        Self::open_at(&dir.join(DB_FILE))
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "local storage opened");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key. Missing keys are not an error.
    pub fn kv_remove(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl CheckinRepository for Database {
    fn load(&self) -> Result<Vec<CheckinRecord>> {
        Ok(self
            .kv_get(CHECKINS_KEY)?
            .as_deref()
            .map(decode_records)
            .unwrap_or_default())
    }

    fn save(&self, records: &[CheckinRecord]) -> Result<()> {
        let raw = encode_records(records)?;
        self.kv_set(CHECKINS_KEY, &raw)?;
        Ok(())
    }
}
