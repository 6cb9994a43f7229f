use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_ENV: &str = "BUTTER_FLOW_CONFIG_DIR";
const APP_DIR_NAME: &str = "butter-flow";

pub(crate) fn resolve_config_dir() -> PathBuf {
  if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
    let trimmed = dir.trim();
    if !trimmed.is_empty() {
      let path = PathBuf::from(trimmed);
      if fs::create_dir_all(&path).is_ok() {
        return path;
      }
    }
  }
  let base = dirs::config_dir()
    .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
  let dir = base.join(APP_DIR_NAME);
  let _ = fs::create_dir_all(&dir);
  dir
}

pub(crate) fn resolve_config_path(filename: &str) -> PathBuf {
  resolve_config_dir().join(filename)
}

/// Resolves a user-supplied path: absolute paths are kept, relative ones land in the config dir.
pub(crate) fn resolve_relative_to_config(raw: &str, fallback: &str) -> PathBuf {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return resolve_config_path(fallback);
  }
  let path = Path::new(trimmed);
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    resolve_config_dir().join(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn config_dir_env_override_is_created_and_used() {
    let root = tempfile::tempdir().unwrap();
    let config = root.path().join("nested").join("butter");

    std::env::set_var(CONFIG_DIR_ENV, &config);
    let dir = resolve_config_dir();
    let settings = resolve_config_path("settings.json");
    let relative = resolve_relative_to_config("prefs/mine.json", "preferences.json");
    let fallback = resolve_relative_to_config("  ", "preferences.json");
    std::env::remove_var(CONFIG_DIR_ENV);

    assert_eq!(dir, config);
    assert!(config.is_dir());
    assert_eq!(settings, config.join("settings.json"));
    assert_eq!(relative, config.join("prefs").join("mine.json"));
    assert_eq!(fallback, config.join("preferences.json"));
  }

  #[test]
  fn absolute_paths_are_kept() {
    let abs = std::env::temp_dir().join("prefs.json");
    let resolved = resolve_relative_to_config(abs.to_str().unwrap(), "preferences.json");
    assert_eq!(resolved, abs);
  }
}
