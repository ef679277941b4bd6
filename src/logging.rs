use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{DEFAULT_LOG_FILTER, DESKTOP_LOG_FILE, LOG_DIR_FALLBACK, LOG_TIME_FORMAT};

/// Keeps the non-blocking file writer alive for the process lifetime.
#[derive(Default)]
pub(crate) struct LogGuardState {
    guard: Mutex<Option<WorkerGuard>>,
}

impl LogGuardState {
    pub(crate) fn set(&self, guard: WorkerGuard) {
        if let Ok(mut slot) = self.guard.lock() {
            *slot = Some(guard);
        }
    }
}

pub(crate) fn resolve_log_dir(app_log_dir: Option<PathBuf>) -> PathBuf {
    app_log_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| env::temp_dir().join(LOG_DIR_FALLBACK).join("logs"))
}

pub(crate) fn init_logging(log_dir: &Path) -> Result<WorkerGuard, String> {
    fs::create_dir_all(log_dir).map_err(|error| {
        format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            error
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(log_dir, DESKTOP_LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|error| format!("Failed to install log subscriber: {error}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_log_dir_prefers_app_log_dir() {
        let dir = PathBuf::from("/var/log/bizonance");
        assert_eq!(resolve_log_dir(Some(dir.clone())), dir);
    }

    #[test]
    fn resolve_log_dir_falls_back_to_temp_dir() {
        let expected = env::temp_dir().join(LOG_DIR_FALLBACK).join("logs");
        assert_eq!(resolve_log_dir(None), expected);
        assert_eq!(resolve_log_dir(Some(PathBuf::new())), expected);
    }

    #[test]
    fn init_logging_creates_missing_log_dir() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let log_dir = temp.path().join("nested").join("logs");

        // A subscriber may already be installed by another test; the directory
        // is created before that point either way.
        let _ = init_logging(&log_dir);

        assert!(log_dir.is_dir());
    }
}
