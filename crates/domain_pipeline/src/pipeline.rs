//! Full preprocessing pipeline
//!
//! ```text
//! transform step 1 -> ... -> transform step N -> null imputation -> validation
//! ```
//!
//! Steps run strictly in the configured order because later steps consume
//! columns produced by earlier ones. The first failure aborts the run; no
//! partial frame is ever returned.

use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{ArtifactRoot, Frame};
use crate::error::PipelineError;
use crate::imputation::{impute, ImputationDictionary};
use crate::transform::run_step;
use crate::validation::ColumnValidator;

/// One configured transform step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Step name, for logs
    pub name: String,
    /// Transform artifact path, relative to the artifact root
    pub pipeline: String,
}

impl StepDescriptor {
    pub fn new(name: impl Into<String>, pipeline: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipeline: pipeline.into(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Transform steps, in execution order
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
    /// Imputation dictionary path, relative to the artifact root
    pub imputation_path: String,
}

/// Runs transform steps, imputation and validation over a frame
#[derive(Debug, Clone)]
pub struct FullPipeline {
    root: ArtifactRoot,
    config: PipelineConfig,
    validator: ColumnValidator,
}

impl FullPipeline {
    pub fn new(root: ArtifactRoot, config: PipelineConfig) -> Self {
        Self {
            root,
            config,
            validator: ColumnValidator::default(),
        }
    }

    /// Replaces the default validator
    pub fn with_validator(mut self, validator: ColumnValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline
    ///
    /// # Errors
    ///
    /// Propagates the first failing stage's error unchanged.
    pub fn run(&self, mut frame: Frame) -> Result<Frame, PipelineError> {
        for step in &self.config.steps {
            info!(step = %step.name, pipeline = %step.pipeline, "Running transform step");
            frame = run_step(frame, &self.root.resolve(&step.pipeline))?;
        }

        info!(path = %self.config.imputation_path, "Loading imputation dictionary");
        let dictionary = ImputationDictionary::load(&self.root.resolve(&self.config.imputation_path))
            .map_err(PipelineError::ImputationDictionary)?;

        info!("Imputing missing values");
        frame = impute(frame, &dictionary).map_err(PipelineError::Imputation)?;

        info!("Validating columns and types");
        Ok(self.validator.validate(frame)?)
    }
}
