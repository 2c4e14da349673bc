//! Model retraining
//!
//! Fits a fresh softmax-regression model on an uploaded record set:
//!
//! 1. select the configured feature and target columns
//! 2. shuffle rows with a seeded generator and hold out a test fraction
//! 3. standardize features on the training rows
//! 4. fit an L2-penalized multinomial logistic regression with `linfa`
//! 5. score accuracy on the held-out rows
//!
//! The fitted weights are copied into a [`SoftmaxRegression`] artifact, which
//! is what gets persisted and served.

use chrono::Utc;
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};
use uuid::Uuid;

use core_kernel::Frame;
use crate::classifier::Classifier;
use crate::error::ModelError;
use crate::softmax::{
    Hyperparameters, ModelKind, SoftmaxRegression, StandardScaler, TrainingMetadata,
    MODEL_FORMAT_VERSION,
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSettings {
    /// Feature columns, in model order
    pub features: Vec<String>,
    pub target_column: String,
    /// Held-out fraction, in `(0, 1)`
    pub test_size: f64,
    /// Shuffle seed
    pub random_state: u64,
    /// Run the preprocessing pipeline over the upload before fitting
    #[serde(default)]
    pub apply_pipeline: bool,
}

impl TrainingSettings {
    fn check(&self) -> Result<(), ModelError> {
        if self.features.is_empty() {
            return Err(ModelError::InvalidSettings("no feature columns configured".to_string()));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ModelError::InvalidSettings(format!(
                "test_size must be between 0 and 1, got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: SoftmaxRegression,
    /// Fraction of held-out rows labelled correctly
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl TrainingReport {
    pub fn message(&self) -> String {
        format!("Model retrained with accuracy: {}", self.accuracy)
    }
}

/// Fits a model on `frame`
///
/// `base` carries the hyperparameters of the currently served model; the
/// defaults are used when there is none.
pub fn train(
    frame: &Frame,
    settings: &TrainingSettings,
    base: Option<Hyperparameters>,
) -> Result<TrainingReport, ModelError> {
    settings.check()?;

    let features = frame.select(&settings.features)?.to_numeric_rows()?;
    let targets = target_labels(frame, &settings.target_column)?;

    let rows = features.len();
    if rows < 2 {
        return Err(ModelError::InsufficientData { rows });
    }

    let (train_idx, test_idx) = split(rows, settings.test_size, settings.random_state);

    let classes: Vec<i64> = train_idx
        .iter()
        .map(|&i| targets[i])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if classes.len() < 2 {
        return Err(ModelError::SingleClass(targets[train_idx[0]]));
    }

    let hyperparameters = base.unwrap_or_default();

    debug!(
        train_rows = train_idx.len(),
        test_rows = test_idx.len(),
        classes = classes.len(),
        ?hyperparameters,
        "Fitting multinomial logistic regression"
    );

    let x_train = records(&features, &train_idx, settings.features.len())?;
    let y_train: Array1<i64> = train_idx.iter().map(|&i| targets[i]).collect();

    let mut model = fit(x_train, y_train, settings.features.clone(), classes, hyperparameters)?;

    let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| features[i].clone()).collect();
    let predicted = model.predict_rows(&x_test)?;
    let correct = predicted
        .iter()
        .zip(test_idx.iter().map(|&i| targets[i]))
        .filter(|(p, t)| **p == *t)
        .count();
    let accuracy = correct as f64 / test_idx.len() as f64;

    model.metadata = Some(TrainingMetadata {
        run_id: Uuid::new_v4(),
        trained_at: Utc::now(),
        accuracy,
        test_size: settings.test_size,
        random_state: settings.random_state,
        training_rows: train_idx.len(),
        test_rows: test_idx.len(),
    });

    info!(
        accuracy,
        test_size = settings.test_size,
        random_state = settings.random_state,
        train_rows = train_idx.len(),
        test_rows = test_idx.len(),
        "Model trained"
    );

    Ok(TrainingReport {
        model,
        accuracy,
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
    })
}

fn target_labels(frame: &Frame, column: &str) -> Result<Vec<i64>, ModelError> {
    let data = frame.require(column)?;
    (0..data.len())
        .map(|row| {
            let value = data.get(row);
            value.as_ref().and_then(|v| v.as_i64()).ok_or_else(|| ModelError::InvalidTarget {
                column: column.to_string(),
                row,
                value: value.map(|v| v.to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

/// Seeded shuffle, then the first `ceil(rows * test_size)` rows are held out;
/// both sides keep at least one row
fn split(rows: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let test_rows = ((rows as f64 * test_size).ceil() as usize).clamp(1, rows - 1);
    let train = indices.split_off(test_rows);
    (train, indices)
}

/// Row-major feature matrix of the selected rows
fn records(features: &[Vec<f64>], rows: &[usize], width: usize) -> Result<Array2<f64>, ModelError> {
    let flat: Vec<f64> = rows.iter().flat_map(|&i| features[i].iter().copied()).collect();
    Array2::from_shape_vec((rows.len(), width), flat).map_err(|e| ModelError::Fit(e.to_string()))
}

fn fit(
    x: Array2<f64>,
    y: Array1<i64>,
    feature_names: Vec<String>,
    classes: Vec<i64>,
    hyperparameters: Hyperparameters,
) -> Result<SoftmaxRegression, ModelError> {
    let scaler = StandardScaler::fit(&x);
    let dataset = Dataset::new(scaler.transform(&x), y);

    let fitted = MultiLogisticRegression::default()
        .alpha(hyperparameters.alpha)
        .max_iterations(hyperparameters.max_iterations)
        .gradient_tolerance(hyperparameters.gradient_tolerance)
        .fit(&dataset)
        .map_err(|e| ModelError::Fit(e.to_string()))?;

    // linfa keeps one weight column per class, classes in ascending order
    let coefficients = fitted.params().t().outer_iter().map(|w| w.to_vec()).collect();
    let intercepts = fitted.intercept().to_vec();

    let model = SoftmaxRegression {
        format_version: MODEL_FORMAT_VERSION,
        kind: ModelKind::SoftmaxRegression,
        feature_names,
        classes,
        scaler,
        coefficients,
        intercepts,
        hyperparameters,
        metadata: None,
    };
    model.check_dimensions().map_err(ModelError::Fit)?;
    Ok(model)
}
