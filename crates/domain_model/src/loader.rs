//! Model loading

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use core_kernel::{read_versioned_json, ArtifactRoot};
use crate::classifier::Classifier;
use crate::error::ModelError;
use crate::softmax::{SoftmaxRegression, MODEL_FORMAT_VERSION};

/// Reads the serving model from a configured path
#[derive(Debug, Clone)]
pub struct ModelLoader {
    root: ArtifactRoot,
    model_path: String,
}

impl ModelLoader {
    pub fn new(root: ArtifactRoot, model_path: impl Into<String>) -> Self {
        Self {
            root,
            model_path: model_path.into(),
        }
    }

    /// Absolute location of the model file
    pub fn path(&self) -> PathBuf {
        self.root.resolve(&self.model_path)
    }

    /// Deserializes and checks the model artifact
    ///
    /// # Errors
    ///
    /// `ArtifactNotFound` when the file is absent; `Deserialization` when it
    /// is corrupt, of another format version, or dimensionally inconsistent.
    pub fn load_softmax(&self) -> Result<SoftmaxRegression, ModelError> {
        let path = self.path();
        let model: SoftmaxRegression = read_versioned_json(&path, MODEL_FORMAT_VERSION)?;

        model
            .check_dimensions()
            .map_err(|message| ModelError::Deserialization {
                path: path.clone(),
                message,
            })?;

        info!(
            path = %path.display(),
            features = model.feature_names.len(),
            classes = model.classes.len(),
            "Model loaded"
        );
        Ok(model)
    }

    pub fn load(&self) -> Result<Arc<dyn Classifier>, ModelError> {
        Ok(Arc::new(self.load_softmax()?))
    }
}
