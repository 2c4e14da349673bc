//! Model Domain
//!
//! This crate holds the classifier that scores preprocessed claims and the
//! machinery to serve and retrain it.
//!
//! # Key Concepts
//!
//! - **Classifier**: anything that maps feature rows to integer labels
//! - **Softmax regression**: the persisted model kind, a JSON artifact
//! - **Model handle**: the shared serving slot, loaded lazily and swapped on retrain
//! - **Training**: seeded split, `linfa` logistic regression fit and held-out accuracy

pub mod classifier;
pub mod softmax;
pub mod loader;
pub mod handle;
pub mod training;
pub mod error;

pub use classifier::Classifier;
pub use softmax::{Hyperparameters, ModelKind, SoftmaxRegression, StandardScaler, TrainingMetadata, MODEL_FORMAT_VERSION};
pub use loader::ModelLoader;
pub use handle::ModelHandle;
pub use training::{train, TrainingReport, TrainingSettings};
pub use error::ModelError;
