// Butter Flow - generation controller runtime

pub mod constants;
pub mod constraint;
pub mod errors;
pub mod generation;
pub mod orchestrator;
pub mod panel;
mod paths;
pub mod preferences;
pub mod presentation;
pub mod shell;
pub mod state;
mod util;

use crate::constants::{LOG_FILE_PREFIX, SETTINGS_FILE};
use crate::generation::HttpTransport;
use crate::orchestrator::Orchestrator;
use crate::panel::ParameterPanel;
use crate::preferences::PreferenceStore;
use crate::presentation::{Presentation, SystemClipboard};
use crate::shell::{run_shell, Session};
use crate::state::{load_settings, save_settings_file, Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

fn init_logging(settings: &Settings) -> Option<WorkerGuard> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));

    let appender = settings.log_dir().and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .build(&dir)
            .map_err(|e| eprintln!("Cannot log to {}: {}", dir.display(), e))
            .ok()
    });

    match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .init();
            Some(guard)
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .init();
            None
        }
    }
}

const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Reads `.env.local` then `.env` from `start` and its two nearest parents,
/// closest first. Variables that are already set are never replaced.
fn load_local_env(start: &Path) -> Vec<(PathBuf, Result<(), dotenvy::Error>)> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| ENV_FILES.iter().map(move |name| dir.join(name)))
        .filter(|path| path.is_file())
        .map(|path| {
            let loaded = dotenvy::from_path(&path);
            (path, loaded)
        })
        .collect()
}

pub fn run() {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_files = load_local_env(&cwd);

    let settings_path = paths::resolve_config_path(SETTINGS_FILE);
    let settings = load_settings(&settings_path);
    let _log_guard = init_logging(&settings);

    for (path, loaded) in &env_files {
        match loaded {
            Ok(()) => debug!("Loaded environment from {}", path.display()),
            Err(err) => warn!("Skipped {}: {}", path.display(), err),
        }
    }
    info!("Starting Butter Flow (endpoint {})", settings.endpoint);
    if !settings_path.exists() {
        if let Err(err) = save_settings_file(&settings_path, &settings) {
            warn!("Default settings not written. {}", err);
        }
    }

    let transport = match HttpTransport::new(
        &settings.endpoint,
        settings.connect_timeout(),
        settings.read_timeout(),
    ) {
        Ok(transport) => transport,
        Err(err) => {
            let err = errors::AppError::from(err);
            error!("{}", err);
            eprintln!("{}", err);
            return;
        }
    };

    let store = PreferenceStore::open(settings.preferences_path());
    let mut session = Session::new(
        ParameterPanel::initialize(store),
        Orchestrator::new(transport),
        Presentation::new(SystemClipboard),
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(err) = run_shell(&mut session, stdin.lock(), stdout.lock()) {
        error!("Shell stopped: {}", err);
    }
    info!("Butter Flow shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn env_files_fill_gaps_without_overriding() {
        let root = tempfile::tempdir().unwrap();
        let child = root.path().join("child");
        fs::create_dir_all(&child).unwrap();
        fs::write(
            root.path().join(".env"),
            "# shared defaults\nBUTTER_FLOW_TEST_PARENT=parent\nBUTTER_FLOW_TEST_SHARED=parent\n",
        )
        .unwrap();
        fs::write(
            child.join(".env.local"),
            "BUTTER_FLOW_TEST_SHARED=child\nBUTTER_FLOW_TEST_PRESET=file\n",
        )
        .unwrap();
        std::env::set_var("BUTTER_FLOW_TEST_PRESET", "process");

        let loaded = load_local_env(&child);

        assert!(loaded.iter().any(|(path, result)| path == &child.join(".env.local") && result.is_ok()));
        assert!(loaded.iter().any(|(path, result)| path == &root.path().join(".env") && result.is_ok()));
        assert_eq!(std::env::var("BUTTER_FLOW_TEST_SHARED").unwrap(), "child");
        assert_eq!(std::env::var("BUTTER_FLOW_TEST_PARENT").unwrap(), "parent");
        assert_eq!(std::env::var("BUTTER_FLOW_TEST_PRESET").unwrap(), "process");
    }

    #[test]
    fn missing_env_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let loaded = load_local_env(&nested);
        assert!(loaded.is_empty());
    }
}
