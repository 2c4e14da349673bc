//! Core error types used across the system

use thiserror::Error;

use crate::value::DType;

/// Errors raised by tabular record set operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Cannot convert value '{value}' in column '{column}' to {to}")]
    TypeConversion {
        column: String,
        to: DType,
        value: String,
    },

    #[error("Column '{column}' has a missing value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Column '{column}' is {dtype}, expected a numeric column")]
    NonNumeric { column: String, dtype: DType },

    #[error("Row index {index} out of bounds for {len} rows")]
    RowOutOfBounds { index: usize, len: usize },
}

impl FrameError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        FrameError::MissingColumn(column.into())
    }

    pub fn conversion(column: impl Into<String>, to: DType, value: impl ToString) -> Self {
        FrameError::TypeConversion {
            column: column.into(),
            to,
            value: value.to_string(),
        }
    }

    /// Returns true when the error is caused by an absent column
    pub fn is_missing_column(&self) -> bool {
        matches!(self, FrameError::MissingColumn(_))
    }
}
