//! Flat, string-valued preference store that survives restarts.
//!
//! Reads never fail: a missing or corrupted backing file behaves like an
//! empty store and every lookup yields the caller's default. Writes go
//! straight to disk so a value is durable as soon as `set` returns.

use crate::errors::AppError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Opens the store backed by `path`, starting empty if the file is absent or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        debug!("Loaded {} preference(s) from {}", entries.len(), path.display());
        Self {
            path: Some(path),
            entries,
        }
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str, default: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Returns the recorded value, if any.
    pub fn get_recorded(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Parses the recorded value; absent or unparsable entries yield `None`.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get_recorded(key)?.trim().parse().ok()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_parsed(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
        if let Err(err) = self.flush() {
            warn!("Preference '{}' kept in memory only. {}", key, err);
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, value.to_string());
    }

    fn flush(&self) -> Result<(), AppError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Cannot create {}: {}", parent.display(), e)))?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| AppError::Storage(format!("Cannot encode preferences: {}", e)))?;
        fs::write(path, raw)
            .map_err(|e| AppError::Storage(format!("Cannot write {}: {}", path.display(), e)))
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return BTreeMap::new(),
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                "Preference file {} is corrupted ({}); starting from defaults",
                path.display(),
                err
            );
            BTreeMap::new()
        }
    }
}
