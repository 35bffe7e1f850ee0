//! Where LeafScan keeps its files.
//!
//! Everything lives under one `.leafscan` directory in the OS config root;
//! `LEAFSCAN_CONFIG_HOME` relocates it for tests or portable installs.

use std::path::PathBuf;
use std::sync::Mutex;

use directories::BaseDirs;
use thiserror::Error;

/// Directory created under the OS config root.
pub const APP_DIR_NAME: &str = ".leafscan";
/// Environment variable that relocates the whole application directory.
pub const CONFIG_HOME_ENV_VAR: &str = "LEAFSCAN_CONFIG_HOME";

static CONFIG_BASE_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No suitable base directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolve the `.leafscan` root, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    ensure_dir(base.join(APP_DIR_NAME))
}

/// Resolve the log directory inside the root, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    let root = app_root_dir()?;
    ensure_dir(root.join("logs"))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn config_base_dir() -> Option<PathBuf> {
    if let Some(path) = CONFIG_BASE_OVERRIDE
        .lock()
        .ok()
        .and_then(|guard| guard.clone())
    {
        return Some(path);
    }
    match std::env::var(CONFIG_HOME_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

#[cfg(test)]
fn set_config_base_override(path: Option<PathBuf>) {
    let mut guard = CONFIG_BASE_OVERRIDE
        .lock()
        .expect("config base override mutex poisoned");
    *guard = path;
}
