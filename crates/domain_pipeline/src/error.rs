//! Preprocessing domain errors

use core_kernel::{ArtifactError, FrameError};
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised while applying a single transform operation
#[derive(Debug, Error)]
pub enum TransformError {
    /// The operation references a column the frame does not hold
    #[error("unresolved column '{0}'")]
    UnresolvedColumn(String),

    #[error(transparent)]
    Frame(FrameError),
}

impl From<FrameError> for TransformError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::MissingColumn(column) => TransformError::UnresolvedColumn(column),
            other => TransformError::Frame(other),
        }
    }
}

/// Errors that can occur while running the preprocessing pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load transform step: {0}")]
    TransformArtifact(#[source] ArtifactError),

    #[error("Failed to load imputation dictionary: {0}")]
    ImputationDictionary(#[source] ArtifactError),

    #[error("Error executing pipeline step '{step}' at operation {operation} ({op}): {source}")]
    PipelineExecution {
        step: String,
        operation: usize,
        op: &'static str,
        #[source]
        source: TransformError,
    },

    #[error("Null imputation failed: {0}")]
    Imputation(#[source] FrameError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    /// Returns true when a required artifact file is absent
    pub fn is_not_found(&self) -> bool {
        match self {
            PipelineError::TransformArtifact(e) | PipelineError::ImputationDictionary(e) => {
                e.is_not_found()
            }
            _ => false,
        }
    }
}
