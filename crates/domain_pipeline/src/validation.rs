//! Column validation
//!
//! The last pipeline stage checks that every column the model consumes is
//! present, coerces it to its expected element type, and rejects missing
//! cells. Every required column is checked; all violations are reported
//! together.

use thiserror::Error;

use core_kernel::{DType, Frame, FrameError};

/// Columns the model consumes and their element types
pub const REQUIRED_COLUMNS: [(&str, DType); 5] = [
    ("log_total_piezas", DType::Float),
    ("marca_vehiculo_encoded", DType::Int),
    ("valor_vehiculo", DType::Int),
    ("valor_por_pieza", DType::Int),
    ("antiguedad_vehiculo", DType::Int),
];

/// A single failed column check
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnViolation {
    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    #[error("column '{column}' cannot be converted to {expected}: {source}")]
    TypeConversion {
        column: String,
        expected: DType,
        #[source]
        source: FrameError,
    },
}

impl ColumnViolation {
    pub fn column(&self) -> &str {
        match self {
            ColumnViolation::MissingColumn { column } | ColumnViolation::TypeConversion { column, .. } => {
                column
            }
        }
    }
}

/// Validation failure carrying every violation found
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Data validation failed: {}", describe(.violations))]
pub struct ValidationError {
    pub violations: Vec<ColumnViolation>,
}

fn describe(violations: &[ColumnViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks and coerces required columns
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValidator {
    required: Vec<(String, DType)>,
}

impl Default for ColumnValidator {
    fn default() -> Self {
        Self::new(REQUIRED_COLUMNS.iter().map(|(name, dtype)| (name.to_string(), *dtype)))
    }
}

impl ColumnValidator {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = (S, DType)>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        }
    }

    pub fn required(&self) -> &[(String, DType)] {
        &self.required
    }

    /// Validates `frame`, returning it with required columns coerced
    pub fn validate(&self, mut frame: Frame) -> Result<Frame, ValidationError> {
        let mut violations = Vec::new();

        for (column, expected) in &self.required {
            if !frame.contains(column) {
                violations.push(ColumnViolation::MissingColumn {
                    column: column.clone(),
                });
                continue;
            }

            if let Err(source) = frame.cast_column(column, *expected) {
                violations.push(ColumnViolation::TypeConversion {
                    column: column.clone(),
                    expected: *expected,
                    source,
                });
                continue;
            }

            let first_missing = frame
                .column(column)
                .and_then(|data| (0..data.len()).find(|&row| data.is_missing(row)));
            if let Some(row) = first_missing {
                violations.push(ColumnViolation::TypeConversion {
                    column: column.clone(),
                    expected: *expected,
                    source: FrameError::MissingValue {
                        column: column.clone(),
                        row,
                    },
                });
            }
        }

        if violations.is_empty() {
            Ok(frame)
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// Validates against [`REQUIRED_COLUMNS`]
pub fn validate_types(frame: Frame) -> Result<Frame, ValidationError> {
    ColumnValidator::default().validate(frame)
}
