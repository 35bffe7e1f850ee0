//! Bounded, file-backed record of past predictions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::app_dirs;
use crate::classify::Prediction;

/// Entries kept on disk and shown in the panel.
pub const HISTORY_LIMIT: usize = 5;
/// File name under the application directory.
pub const HISTORY_FILE_NAME: &str = "prediction_history.json";

/// One stored prediction. The file holds these newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub class: String,
    pub confidence: f64,
    /// RFC 3339 UTC stamp taken when the result arrived.
    pub timestamp: String,
    /// Unix-millisecond id, strictly greater than any older entry's.
    pub id: i64,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to create history directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format history timestamp: {0}")]
    FormatTime(#[from] time::error::Format),
}

/// Owns the history file; every read and write goes through here.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside the per-user application directory.
    pub fn default_location() -> Result<Self, app_dirs::AppDirError> {
        Ok(Self::new(app_dirs::app_root_dir()?.join(HISTORY_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored entries, newest first. A missing, unreadable, or corrupt
    /// file is an empty history, never an error.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!("failed to read history file {}: {err}", self.path.display());
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
            Ok(mut entries) => {
                entries.truncate(HISTORY_LIMIT);
                entries
            }
            Err(err) => {
                tracing::warn!(
                    "discarding corrupt history file {}: {err}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Stamp `prediction`, prepend it, evict past the cap, and persist.
    /// Returns the updated list for display.
    pub fn record(&self, prediction: &Prediction) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.load();
        let entry = HistoryEntry {
            class: prediction.class.clone(),
            confidence: prediction.confidence,
            timestamp: OffsetDateTime::now_utc().format(&Rfc3339)?,
            id: next_id(&entries),
        };
        entries.insert(0, entry);
        entries.truncate(HISTORY_LIMIT);
        self.persist(&entries)?;
        Ok(entries)
    }

    /// Write through a temp file and rename so a crash cannot leave a torn
    /// history behind.
    fn persist(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| HistoryError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let data = serde_json::to_vec(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &data).map_err(|source| HistoryError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| HistoryError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

/// Millisecond timestamp bumped past the newest stored id, so two results in
/// the same millisecond still get distinct, ordered ids. The bump saturates:
/// a hand-edited file can carry an id at the integer ceiling, and that must
/// not abort a record.
fn next_id(entries: &[HistoryEntry]) -> i64 {
    let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    match entries.iter().map(|entry| entry.id).max() {
        Some(newest) => now_ms.max(newest.saturating_add(1)),
        None => now_ms,
    }
}
