//! Append-only CSV prediction log
//!
//! One process-wide instance owns the file handle. Each entry is encoded to a
//! complete line first and written with a single `write_all` under the
//! mutex, so concurrent requests never interleave partial rows. The header
//! is written once, when the file is created or found empty.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use domain_claims::PredictionLogEntry;
use crate::error::StoreError;

pub struct PredictionLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl PredictionLog {
    /// Opens the log for appending, creating it and its directory if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        let len = file.metadata().map_err(|e| StoreError::io(&path, e))?.len();
        if len == 0 {
            let header = encode_line(&PredictionLogEntry::COLUMNS)?;
            file.write_all(&header).map_err(|e| StoreError::io(&path, e))?;
            info!(path = %path.display(), "Created prediction log");
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a single line
    pub fn append(&self, entry: &PredictionLogEntry) -> Result<(), StoreError> {
        let line = encode_line(entry)?;

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(&line).map_err(|e| StoreError::io(&self.path, e))?;
        file.flush().map_err(|e| StoreError::io(&self.path, e))?;

        debug!(claim_id = entry.claim_id, prediction = entry.prediction, "Prediction logged");
        Ok(())
    }
}

impl std::fmt::Debug for PredictionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionLog").field("path", &self.path).finish()
    }
}

/// Encodes one CSV record, terminator included
fn encode_line<T: serde::Serialize>(record: T) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.serialize(record)?;
    writer
        .into_inner()
        .map_err(|e| StoreError::io(PathBuf::new(), e.into_error()))
}
