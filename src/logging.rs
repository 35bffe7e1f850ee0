//! Logging setup: a global tracing subscriber writing to stdout and a
//! per-launch file under the application's `logs/` directory, with old
//! launch files pruned so the directory stays small.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use crate::app_dirs;

/// Log files kept across launches, the current one included.
const MAX_LOG_FILES: usize = 5;
const LOG_FILE_PREFIX: &str = "leafscan";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No suitable directory available for log files")]
    NoLogDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing for this process. Subsequent calls are no-ops, and
/// failures are returned so startup can continue without file logging.
pub fn init() -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let log_dir = app_dirs::logs_dir().map_err(|err| match err {
        app_dirs::AppDirError::NoBaseDir => LoggingError::NoLogDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            LoggingError::CreateDir { path, source }
        }
    })?;
    // This launch's file does not exist until the first write, so budget a
    // slot for it when pruning.
    let pruned = prune_stale_logs(&log_dir, MAX_LOG_FILES.saturating_sub(1));
    let file_name = log_file_name(OffsetDateTime::now_utc())?;

    let appender = rolling::never(&log_dir, &file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = Registry::default()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer));
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!(
        "logging initialized; file at {}",
        log_dir.join(&file_name).display()
    );
    if pruned > 0 {
        tracing::debug!("pruned {pruned} old log file(s)");
    }
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = now.format(STAMP).map_err(LoggingError::FormatTime)?;
    Ok(format!("{LOG_FILE_PREFIX}_{stamp}.log"))
}

/// Delete the oldest `.log` files until at most `keep` remain. Files that
/// cannot be listed or removed are left alone.
fn prune_stale_logs(dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    let mut logs: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("log")
        })
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();
    logs.sort_by_key(|(modified, _)| *modified);

    let mut removed = 0;
    while logs.len() > keep {
        let (_, path) = logs.remove(0);
        if fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    removed
}
