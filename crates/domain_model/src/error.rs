//! Model domain errors

use std::path::PathBuf;
use thiserror::Error;

use core_kernel::{ArtifactError, FrameError};

/// Errors that can occur while loading, running or training a model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model file not found: {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("Failed to deserialize model {}: {message}", .path.display())]
    Deserialization { path: PathBuf, message: String },

    #[error("Failed to read model: {0}")]
    Artifact(#[source] ArtifactError),

    #[error("Inconsistent model: {0}")]
    InvalidModel(String),

    #[error("Model fitting failed: {0}")]
    Fit(String),

    #[error("Feature count mismatch: model expects {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Invalid feature data: {0}")]
    Features(#[from] FrameError),

    #[error("Invalid target value '{value}' in column '{column}' at row {row}")]
    InvalidTarget {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Not enough rows to train: {rows} (need at least 2)")]
    InsufficientData { rows: usize },

    #[error("Training data holds a single class: {0}")]
    SingleClass(i64),

    #[error("Invalid training settings: {0}")]
    InvalidSettings(String),
}

impl From<ArtifactError> for ModelError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound { path } => ModelError::ArtifactNotFound { path },
            ArtifactError::Deserialization { path, message } => ModelError::Deserialization { path, message },
            ArtifactError::UnsupportedVersion { ref path, .. } => ModelError::Deserialization {
                path: path.clone(),
                message: err.to_string(),
            },
            other => ModelError::Artifact(other),
        }
    }
}

impl ModelError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::ArtifactNotFound { .. })
    }
}
