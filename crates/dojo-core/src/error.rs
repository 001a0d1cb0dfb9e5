//! Core error types for dojo-core.
//!
//! Eligibility and schedule lookups are total and never fail; errors only
//! come from the edges: local storage, configuration, the static documents
//! and the check-in desk.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dojo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schedule/roster document errors
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Check-in flow errors
    #[error("Check-in error: {0}")]
    Checkin(#[from] CheckinError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the storage database
    #[error("Failed to open storage at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Storage is locked by another process
    #[error("Storage is locked")]
    Locked,

    /// Failed to encode a value before writing it
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Errors loading the static schedule and roster documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for its shape
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DocumentError {
    /// The one message shown to people at the kiosk, whatever went wrong.
    pub const USER_MESSAGE: &'static str = "Failed to load check-in system. Please try again.";
}

/// Check-in flow errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckinError {
    /// PIN did not match the roster entry
    #[error("Incorrect PIN. Please try again.")]
    IncorrectPin,

    /// Student qualifies both ways and no role was picked
    #[error("{student} can join {class} as a student or a helper; pick a role")]
    RoleRequired { student: String, class: String },

    /// No roster entry with that id
    #[error("Student '{0}' not found")]
    UnknownStudent(String),

    /// No class with that id on the requested day
    #[error("Class '{0}' not found")]
    UnknownClass(String),

    /// No check-in with that id
    #[error("Check-in '{0}' not found")]
    UnknownCheckin(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
