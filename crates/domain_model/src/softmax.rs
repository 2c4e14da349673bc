//! Softmax-regression model artifact
//!
//! The persisted model is a JSON document holding everything needed to score
//! a row: the feature order, a standard scaler, one weight vector and
//! intercept per class, and the hyperparameters it was fitted with.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "kind": "softmax_regression",
//!   "feature_names": ["log_total_piezas", "valor_vehiculo"],
//!   "classes": [0, 1],
//!   "scaler": { "mean": [1.3, 17500.0], "scale": [0.5, 6100.0] },
//!   "coefficients": [[-0.4, -0.2], [0.4, 0.2]],
//!   "intercepts": [0.1, -0.1],
//!   "hyperparameters": { "alpha": 1.0, "max_iterations": 100, "gradient_tolerance": 0.0001 }
//! }
//! ```

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::error::ModelError;

/// Model artifact layout understood by this crate
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    SoftmaxRegression,
}

/// Solver parameters of a multinomial logistic regression fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// L2 penalty on the weights
    pub alpha: f64,
    pub max_iterations: u64,
    pub gradient_tolerance: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 100,
            gradient_tolerance: 1e-4,
        }
    }
}

/// Per-feature standardization `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits mean and population standard deviation per column; constant
    /// columns get a unit scale
    pub fn fit(records: &Array2<f64>) -> Self {
        let mean = records
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(records.ncols()));
        let scale = records
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });

        Self {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        }
    }

    pub fn transform(&self, records: &Array2<f64>) -> Array2<f64> {
        let mean = ArrayView1::from(self.mean.as_slice());
        let scale = ArrayView1::from(self.scale.as_slice());
        (records - &mean) / &scale
    }
}

/// Provenance of a retrained artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub accuracy: f64,
    pub test_size: f64,
    pub random_state: u64,
    pub training_rows: usize,
    pub test_rows: usize,
}

/// Multinomial logistic regression over standardized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    pub format_version: u32,
    pub kind: ModelKind,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub scaler: StandardScaler,
    /// One weight vector per class
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    #[serde(default)]
    pub hyperparameters: Hyperparameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TrainingMetadata>,
}

impl SoftmaxRegression {
    /// Checks that every dimension agrees with the feature and class counts
    pub fn check_dimensions(&self) -> Result<(), String> {
        let width = self.feature_names.len();
        let classes = self.classes.len();

        if width == 0 {
            return Err("model declares no features".to_string());
        }
        if classes < 2 {
            return Err(format!("model declares {classes} class(es), need at least 2"));
        }
        if self.scaler.mean.len() != width || self.scaler.scale.len() != width {
            return Err(format!(
                "scaler has {}/{} entries for {width} features",
                self.scaler.mean.len(),
                self.scaler.scale.len()
            ));
        }
        if self.scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err("scaler holds a zero or non-finite scale".to_string());
        }
        if self.coefficients.len() != classes || self.intercepts.len() != classes {
            return Err(format!(
                "{} coefficient rows and {} intercepts for {classes} classes",
                self.coefficients.len(),
                self.intercepts.len()
            ));
        }
        if let Some(row) = self.coefficients.iter().position(|w| w.len() != width) {
            return Err(format!(
                "coefficient row {row} has {} weights for {width} features",
                self.coefficients[row].len()
            ));
        }
        Ok(())
    }

    /// Unnormalized class scores, one row per record and one column per class
    fn scores(&self, records: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.check_dimensions().map_err(ModelError::InvalidModel)?;
        let shape = (self.classes.len(), self.feature_names.len());
        let weights = Array2::from_shape_vec(shape, self.coefficients.concat())
            .map_err(|e| ModelError::InvalidModel(e.to_string()))?;
        let intercepts = ArrayView1::from(self.intercepts.as_slice());

        Ok(self.scaler.transform(records).dot(&weights.t()) + &intercepts)
    }

    fn records(&self, rows: &[Vec<f64>]) -> Result<Array2<f64>, ModelError> {
        let expected = self.feature_names.len();
        if let Some(row) = rows.iter().find(|r| r.len() != expected) {
            return Err(ModelError::FeatureMismatch {
                expected,
                actual: row.len(),
            });
        }
        Array2::from_shape_vec((rows.len(), expected), rows.concat())
            .map_err(|e| ModelError::InvalidModel(e.to_string()))
    }

    /// Class probabilities of one raw feature row
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        let scores = self.scores(&self.records(&[row.to_vec()])?)?;
        Ok(softmax(scores.row(0)).to_vec())
    }
}

impl Classifier for SoftmaxRegression {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>, ModelError> {
        let scores = self.scores(&self.records(rows)?)?;
        Ok(scores
            .outer_iter()
            .map(|row| self.classes[argmax(row)])
            .collect())
    }

    fn hyperparameters(&self) -> Option<Hyperparameters> {
        Some(self.hyperparameters)
    }

    fn metadata(&self) -> Option<&TrainingMetadata> {
        self.metadata.as_ref()
    }
}

fn softmax(scores: ArrayView1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |m, &s| m.max(s));
    let exps = scores.mapv(|s| (s - max).exp());
    let total = exps.sum();
    exps / total
}

/// Index of the largest score; ties go to the lowest index
fn argmax(scores: ArrayView1<f64>) -> usize {
    scores
        .indexed_iter()
        .fold(0, |best, (i, s)| if *s > scores[best] { i } else { best })
}
