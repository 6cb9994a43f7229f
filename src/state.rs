use crate::constants::{
  CONNECT_TIMEOUT_MS_DEFAULT,
  DEFAULT_ENDPOINT,
  PREFERENCES_FILE,
  READ_TIMEOUT_MS_DEFAULT,
};
use crate::errors::AppError;
use crate::paths::resolve_relative_to_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const ENDPOINT_ENV: &str = "BUTTER_FLOW_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub endpoint: String,
  pub connect_timeout_ms: u64,
  pub read_timeout_ms: u64,
  pub preferences_file: String, // relative paths resolve inside the config dir
  pub log_dir: String,          // empty = stderr only
  pub log_level: String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      endpoint: DEFAULT_ENDPOINT.to_string(),
      connect_timeout_ms: CONNECT_TIMEOUT_MS_DEFAULT,
      read_timeout_ms: READ_TIMEOUT_MS_DEFAULT,
      preferences_file: PREFERENCES_FILE.to_string(),
      log_dir: "".to_string(),
      log_level: "info".to_string(),
    }
  }
}

impl Settings {
  pub fn normalize(&mut self) {
    let endpoint = self.endpoint.trim();
    if endpoint.is_empty() {
      self.endpoint = DEFAULT_ENDPOINT.to_string();
    } else {
      self.endpoint = endpoint.trim_end_matches('/').to_string();
    }
    if self.connect_timeout_ms < 100 {
      self.connect_timeout_ms = 100;
    }
    if self.connect_timeout_ms > 60_000 {
      self.connect_timeout_ms = 60_000;
    }
    if self.read_timeout_ms < 500 {
      self.read_timeout_ms = 500;
    }
    if self.read_timeout_ms > 300_000 {
      self.read_timeout_ms = 300_000;
    }
    if self.preferences_file.trim().is_empty() {
      self.preferences_file = PREFERENCES_FILE.to_string();
    }
    if self.log_level.trim().is_empty() {
      self.log_level = "info".to_string();
    }
  }

  pub fn connect_timeout(&self) -> Duration {
    Duration::from_millis(self.connect_timeout_ms)
  }

  pub fn read_timeout(&self) -> Duration {
    Duration::from_millis(self.read_timeout_ms)
  }

  pub fn preferences_path(&self) -> PathBuf {
    resolve_relative_to_config(&self.preferences_file, PREFERENCES_FILE)
  }

  pub fn log_dir(&self) -> Option<PathBuf> {
    let trimmed = self.log_dir.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(PathBuf::from(trimmed))
    }
  }

  fn apply_env_overrides(&mut self) {
    if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
      if !endpoint.trim().is_empty() {
        self.endpoint = endpoint;
      }
    }
  }
}

pub fn load_settings(path: &Path) -> Settings {
  let mut settings = match fs::read_to_string(path) {
    Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
      warn!("Ignoring unreadable settings file {}: {}", path.display(), err);
      Settings::default()
    }),
    Err(_) => Settings::default(),
  };
  settings.apply_env_overrides();
  settings.normalize();
  settings
}

pub fn save_settings_file(path: &Path, settings: &Settings) -> Result<(), AppError> {
  let storage = |e: std::io::Error| AppError::Storage(format!("{}: {}", path.display(), e));
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(storage)?;
  }
  let raw = serde_json::to_string_pretty(settings).map_err(|e| AppError::Storage(e.to_string()))?;
  fs::write(path, raw).map_err(storage)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings(&dir.path().join("settings.json"));
    assert_eq!(settings.connect_timeout_ms, CONNECT_TIMEOUT_MS_DEFAULT);
    assert_eq!(settings.read_timeout_ms, READ_TIMEOUT_MS_DEFAULT);
    assert_eq!(settings.preferences_file, PREFERENCES_FILE);
  }

  #[test]
  fn corrupt_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();
    let settings = load_settings(&path);
    assert_eq!(settings.read_timeout_ms, READ_TIMEOUT_MS_DEFAULT);
  }

  #[test]
  fn partial_file_keeps_defaults_for_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "read_timeout_ms": 12000 }"#).unwrap();
    let settings = load_settings(&path);
    assert_eq!(settings.read_timeout_ms, 12_000);
    assert_eq!(settings.connect_timeout_ms, CONNECT_TIMEOUT_MS_DEFAULT);
  }

  #[test]
  fn normalize_clamps_timeouts_and_trims_endpoint() {
    let mut settings = Settings {
      endpoint: " http://butter.local:8080/ ".to_string(),
      connect_timeout_ms: 1,
      read_timeout_ms: 10_000_000,
      ..Settings::default()
    };
    settings.normalize();
    assert_eq!(settings.endpoint, "http://butter.local:8080");
    assert_eq!(settings.connect_timeout_ms, 100);
    assert_eq!(settings.read_timeout_ms, 300_000);
  }

  #[test]
  fn empty_endpoint_falls_back_to_default() {
    let mut settings = Settings {
      endpoint: "   ".to_string(),
      ..Settings::default()
    };
    settings.normalize();
    assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
  }

  #[test]
  fn save_then_load_preserves_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");
    let settings = Settings {
      read_timeout_ms: 9_000,
      log_level: "debug".to_string(),
      ..Settings::default()
    };
    save_settings_file(&path, &settings).unwrap();
    let loaded = load_settings(&path);
    assert_eq!(loaded.read_timeout_ms, 9_000);
    assert_eq!(loaded.log_level, "debug");
  }

  #[test]
  fn endpoint_env_overrides_file_unless_blank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "endpoint": "http://from-file:5000" }"#).unwrap();

    std::env::set_var(ENDPOINT_ENV, "http://from-env:7000/");
    let overridden = load_settings(&path);
    std::env::set_var(ENDPOINT_ENV, "   ");
    let blank = load_settings(&path);
    std::env::remove_var(ENDPOINT_ENV);

    assert_eq!(overridden.endpoint, "http://from-env:7000");
    assert_eq!(blank.endpoint, "http://from-file:5000");
  }

  #[test]
  fn save_into_blocked_directory_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not dir").unwrap();
    let err = save_settings_file(&blocker.join("settings.json"), &Settings::default()).unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
  }

  #[test]
  fn log_dir_is_optional() {
    assert!(Settings::default().log_dir().is_none());
    let settings = Settings {
      log_dir: "/var/log/butter".to_string(),
      ..Settings::default()
    };
    assert_eq!(settings.log_dir(), Some(PathBuf::from("/var/log/butter")));
  }
}
