//! Preprocessing Domain
//!
//! This crate turns the raw claim record into the feature frame the model
//! consumes.
//!
//! # Stages
//!
//! - **Transform steps**: declarative column operations read from versioned
//!   JSON artifacts ([`transform`])
//! - **Null imputation**: column defaults read from the imputation dictionary
//!   ([`imputation`])
//! - **Validation**: required columns coerced to their element types
//!   ([`validation`])
//!
//! [`FullPipeline`] composes the three in order.

pub mod transform;
pub mod imputation;
pub mod validation;
pub mod pipeline;
pub mod error;

pub use transform::{run_step, Operand, Operation, Operator, TransformArtifact, TRANSFORM_FORMAT_VERSION};
pub use imputation::{impute, ImputationDictionary};
pub use validation::{validate_types, ColumnValidator, ColumnViolation, ValidationError, REQUIRED_COLUMNS};
pub use pipeline::{FullPipeline, PipelineConfig, StepDescriptor};
pub use error::{PipelineError, TransformError};
