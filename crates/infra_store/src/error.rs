//! Storage error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use core_kernel::FrameError;

/// Errors that can occur while reading or writing stored data
#[derive(Debug, Error)]
pub enum StoreError {
    /// The uploaded CSV could not be parsed
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The uploaded CSV holds a header but no rows, or nothing at all
    #[error("CSV contains no data rows")]
    EmptyCsv,

    /// A file could not be opened, written or renamed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
