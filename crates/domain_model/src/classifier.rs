//! Classifier capability

use std::fmt::Debug;

use core_kernel::Frame;
use crate::error::ModelError;
use crate::softmax::{Hyperparameters, TrainingMetadata};

/// A trained model that labels feature rows
///
/// Implementations are immutable once built; the serving handle shares them
/// across requests behind an `Arc`.
pub trait Classifier: Send + Sync + Debug {
    /// Feature columns the model consumes, in the order it consumes them
    fn feature_names(&self) -> &[String];

    /// Labels each row of a row-major feature matrix
    fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>, ModelError>;

    /// Fitting parameters to reuse when retraining, if any
    fn hyperparameters(&self) -> Option<Hyperparameters> {
        None
    }

    /// Provenance of the run that produced the model, if it was retrained
    fn metadata(&self) -> Option<&TrainingMetadata> {
        None
    }

    /// Selects the model's feature columns from `features` and labels each row
    fn predict(&self, features: &Frame) -> Result<Vec<i64>, ModelError> {
        let rows = features.select(self.feature_names())?.to_numeric_rows()?;
        self.predict_rows(&rows)
    }
}
