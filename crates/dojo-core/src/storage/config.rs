//! TOML-based application configuration.
//!
//! Stores kiosk settings including:
//! - Where the schedule and roster documents live
//! - Check-in retention and the admission window
//! - List sizes and the refresh interval
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use chrono::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::ledger::DEFAULT_RETENTION_DAYS;
use crate::roster::DEFAULT_SEARCH_LIMIT;
use crate::window::DEFAULT_ADMISSION_LEAD_MINUTES;

/// Static document locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_schedule_path")]
    pub schedule_path: PathBuf,
    #[serde(default = "default_roster_path")]
    pub roster_path: PathBuf,
}

/// Check-in behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinSettings {
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_admission_lead_minutes")]
    pub admission_lead_minutes: u32,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl CheckinSettings {
    pub fn retention(&self) -> Duration {
        Duration::days(i64::from(self.retention_days))
    }

    pub fn admission_lead(&self) -> Duration {
        Duration::minutes(i64::from(self.admission_lead_minutes))
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub checkin: CheckinSettings,
}

fn default_schedule_path() -> PathBuf {
    PathBuf::from("assets/data/schedules.json")
}
fn default_roster_path() -> PathBuf {
    PathBuf::from("assets/data/students.json")
}
fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS as u32
}
fn default_admission_lead_minutes() -> u32 {
    DEFAULT_ADMISSION_LEAD_MINUTES as u32
}
fn default_recent_limit() -> usize {
    12
}
fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}
fn default_refresh_interval_secs() -> u64 {
    60
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            schedule_path: default_schedule_path(),
            roster_path: default_roster_path(),
        }
    }
}

impl Default for CheckinSettings {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            admission_lead_minutes: default_admission_lead_minutes(),
            recent_limit: default_recent_limit(),
            search_limit: default_search_limit(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.checkin.retention_days, 7);
        assert_eq!(cfg.checkin.admission_lead_minutes, 120);
        assert_eq!(cfg.checkin.recent_limit, 12);
        assert_eq!(cfg.checkin.search_limit, 24);
        assert_eq!(cfg.checkin.refresh_interval_secs, 60);
        assert_eq!(cfg.checkin.admission_lead(), Duration::hours(2));
        assert_eq!(
            cfg.documents.schedule_path,
            PathBuf::from("assets/data/schedules.json")
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[checkin]\nretention_days = 3\n").unwrap();
        assert_eq!(cfg.checkin.retention_days, 3);
        assert_eq!(cfg.checkin.recent_limit, 12);
        assert_eq!(cfg.documents, DocumentsConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("checkin.retention_days").as_deref(), Some("7"));
        assert_eq!(
            cfg.get("documents.roster_path").as_deref(),
            Some("assets/data/students.json")
        );
        assert!(cfg.get("checkin.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_numbers_and_paths() {
        let mut cfg = Config::default();
        cfg.set("checkin.admission_lead_minutes", "90").unwrap();
        cfg.set("documents.schedule_path", "/srv/dojo/schedules.json").unwrap();
        assert_eq!(cfg.checkin.admission_lead_minutes, 90);
        assert_eq!(
            cfg.documents.schedule_path,
            PathBuf::from("/srv/dojo/schedules.json")
        );
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_value() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("checkin.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("checkin.retention_days", "a week"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.checkin.recent_limit = 5;
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().checkin.recent_limit, 5);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "checkin = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
