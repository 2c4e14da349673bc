//! Declarative transform steps
//!
//! Each configured pipeline step points at a transform artifact: a versioned
//! JSON document listing column operations. Artifacts are data, never code;
//! the runner interprets a closed set of [`Operation`]s against a [`Frame`].
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "total_piezas",
//!   "operations": [
//!     { "op": "sum", "inputs": ["partes_a_reparar", "partes_a_reemplazar"], "output": "total_piezas" },
//!     { "op": "log1p", "input": "total_piezas", "output": "log_total_piezas" }
//!   ]
//! }
//! ```
//!
//! An operation that references a column absent from the frame fails the
//! whole step with [`PipelineError::PipelineExecution`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use core_kernel::{read_versioned_json, ArtifactError, ColumnData, DType, Frame, FrameError, Scalar};
use crate::error::{PipelineError, TransformError};

/// Transform artifact layout understood by this runner
pub const TRANSFORM_FORMAT_VERSION: u32 = 1;

/// A persisted, ordered list of column operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformArtifact {
    pub format_version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operations: Vec<Operation>,
}

impl TransformArtifact {
    /// Creates an artifact at the current format version
    pub fn new(name: impl Into<String>, operations: Vec<Operation>) -> Self {
        Self {
            format_version: TRANSFORM_FORMAT_VERSION,
            name: name.into(),
            description: None,
            operations,
        }
    }

    /// Reads an artifact from disk
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        read_versioned_json(path, TRANSFORM_FORMAT_VERSION)
    }

    /// Applies every operation in order
    ///
    /// # Errors
    ///
    /// Returns `PipelineExecution` naming the step and the index of the
    /// failing operation.
    pub fn apply(&self, mut frame: Frame) -> Result<Frame, PipelineError> {
        for (index, operation) in self.operations.iter().enumerate() {
            operation
                .apply(&mut frame)
                .map_err(|source| PipelineError::PipelineExecution {
                    step: self.name.clone(),
                    operation: index,
                    op: operation.name(),
                    source,
                })?;
        }
        Ok(frame)
    }
}

/// Loads the transform artifact at `path` and applies it to `frame`
pub fn run_step(frame: Frame, path: &Path) -> Result<Frame, PipelineError> {
    let artifact = TransformArtifact::load(path).map_err(PipelineError::TransformArtifact)?;

    debug!(
        step = %artifact.name,
        operations = artifact.operations.len(),
        path = %path.display(),
        "Applying transform artifact"
    );

    artifact.apply(frame)
}

/// Operand of an arithmetic operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Column(String),
    Literal(f64),
}

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// One column operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Row-wise sum of numeric columns
    Sum { inputs: Vec<String>, output: String },

    /// `left <operator> right`; division always yields float and a zero
    /// divisor yields a missing cell
    Arithmetic {
        left: Operand,
        operator: Operator,
        right: Operand,
        output: String,
    },

    /// `ln(1 + x)`
    Log1p { input: String, output: String },

    /// Value lookup keyed by the cell rendered as text
    Map {
        input: String,
        output: String,
        mapping: BTreeMap<String, Scalar>,
        #[serde(default)]
        default: Option<Scalar>,
    },

    Cast { column: String, to: DType },

    Clip {
        column: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },

    /// Fills missing cells of one column
    Fill { column: String, value: Scalar },

    Constant { output: String, value: Scalar },

    Rename { from: String, to: String },

    Drop { columns: Vec<String> },
}

impl Operation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sum { .. } => "sum",
            Operation::Arithmetic { .. } => "arithmetic",
            Operation::Log1p { .. } => "log1p",
            Operation::Map { .. } => "map",
            Operation::Cast { .. } => "cast",
            Operation::Clip { .. } => "clip",
            Operation::Fill { .. } => "fill",
            Operation::Constant { .. } => "constant",
            Operation::Rename { .. } => "rename",
            Operation::Drop { .. } => "drop",
        }
    }

    /// Applies the operation to `frame` in place
    pub fn apply(&self, frame: &mut Frame) -> Result<(), TransformError> {
        match self {
            Operation::Sum { inputs, output } => {
                let data = sum(frame, inputs)?;
                frame.insert(output.as_str(), data)?;
            }
            Operation::Arithmetic {
                left,
                operator,
                right,
                output,
            } => {
                let lhs = Values::evaluate(frame, left)?;
                let rhs = Values::evaluate(frame, right)?;
                frame.insert(output.as_str(), combine(*operator, lhs, rhs))?;
            }
            Operation::Log1p { input, output } => {
                let source = numeric(frame, input)?;
                let data = ColumnData::from_f64(
                    (0..frame.len())
                        .map(|row| source.get_f64(row).map(f64::ln_1p))
                        .collect(),
                );
                frame.insert(output.as_str(), data)?;
            }
            Operation::Map {
                input,
                output,
                mapping,
                default,
            } => {
                let source = frame.require(input)?;
                let values = (0..frame.len())
                    .map(|row| {
                        source.get(row).and_then(|value| {
                            mapping
                                .get(&value.to_string())
                                .cloned()
                                .or_else(|| default.clone())
                        })
                    })
                    .collect();
                frame.insert(output.as_str(), ColumnData::from_scalars(values))?;
            }
            Operation::Cast { column, to } => {
                frame.cast_column(column, *to)?;
            }
            Operation::Clip { column, min, max } => {
                let data = clip(numeric(frame, column)?, *min, *max);
                frame.insert(column.as_str(), data)?;
            }
            Operation::Fill { column, value } => {
                if !frame.fill_missing(column, value)? {
                    return Err(TransformError::UnresolvedColumn(column.clone()));
                }
            }
            Operation::Constant { output, value } => {
                let rows = frame.len();
                frame.insert(output.as_str(), ColumnData::repeat(value, rows))?;
            }
            Operation::Rename { from, to } => {
                frame.rename(from, to)?;
            }
            Operation::Drop { columns } => {
                if let Some(missing) = columns.iter().find(|c| !frame.contains(c)) {
                    return Err(TransformError::UnresolvedColumn(missing.clone()));
                }
                for column in columns {
                    frame.remove(column);
                }
            }
        }
        Ok(())
    }
}

fn numeric<'a>(frame: &'a Frame, name: &str) -> Result<&'a ColumnData, TransformError> {
    let data = frame.require(name)?;
    if data.dtype().is_numeric() {
        Ok(data)
    } else {
        Err(FrameError::NonNumeric {
            column: name.to_string(),
            dtype: data.dtype(),
        }
        .into())
    }
}

fn sum(frame: &Frame, inputs: &[String]) -> Result<ColumnData, TransformError> {
    let columns = inputs
        .iter()
        .map(|name| numeric(frame, name))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = 0..frame.len();

    if columns.iter().all(|c| c.dtype() == DType::Int) {
        Ok(ColumnData::Int(
            rows.map(|row| {
                columns.iter().try_fold(0i64, |acc, c| match c.get(row) {
                    Some(Scalar::Int(v)) => acc.checked_add(v),
                    _ => None,
                })
            })
            .collect(),
        ))
    } else {
        Ok(ColumnData::from_f64(
            rows.map(|row| {
                columns
                    .iter()
                    .try_fold(0.0, |acc, c| c.get_f64(row).map(|v| acc + v))
            })
            .collect(),
        ))
    }
}

/// Evaluated arithmetic operand
enum Values {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
}

impl Values {
    fn evaluate(frame: &Frame, operand: &Operand) -> Result<Self, TransformError> {
        let rows = frame.len();
        match operand {
            Operand::Literal(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                Ok(Values::Int(vec![Some(*v as i64); rows]))
            }
            Operand::Literal(v) => Ok(Values::Float(vec![Some(*v); rows])),
            Operand::Column(name) => match frame.require(name)? {
                ColumnData::Int(cells) => Ok(Values::Int(cells.clone())),
                ColumnData::Float(cells) => Ok(Values::Float(cells.clone())),
                ColumnData::Text(_) => Err(FrameError::NonNumeric {
                    column: name.clone(),
                    dtype: DType::Text,
                }
                .into()),
            },
        }
    }

    fn into_f64(self) -> Vec<Option<f64>> {
        match self {
            Values::Int(cells) => cells.into_iter().map(|c| c.map(|v| v as f64)).collect(),
            Values::Float(cells) => cells,
        }
    }
}

fn combine(operator: Operator, lhs: Values, rhs: Values) -> ColumnData {
    match (operator, lhs, rhs) {
        (Operator::Divide, lhs, rhs) => ColumnData::from_f64(
            lhs.into_f64()
                .into_iter()
                .zip(rhs.into_f64())
                .map(|(l, r)| match (l, r) {
                    (Some(l), Some(r)) if r != 0.0 => Some(l / r),
                    _ => None,
                })
                .collect(),
        ),
        (operator, Values::Int(lhs), Values::Int(rhs)) => ColumnData::Int(
            lhs.into_iter()
                .zip(rhs)
                .map(|(l, r)| {
                    let (l, r) = (l?, r?);
                    match operator {
                        Operator::Add => l.checked_add(r),
                        Operator::Subtract => l.checked_sub(r),
                        Operator::Multiply => l.checked_mul(r),
                        Operator::Divide => None,
                    }
                })
                .collect(),
        ),
        (operator, lhs, rhs) => ColumnData::from_f64(
            lhs.into_f64()
                .into_iter()
                .zip(rhs.into_f64())
                .map(|(l, r)| {
                    let (l, r) = (l?, r?);
                    Some(match operator {
                        Operator::Add => l + r,
                        Operator::Subtract => l - r,
                        Operator::Multiply => l * r,
                        Operator::Divide => l / r,
                    })
                })
                .collect(),
        ),
    }
}

fn bound<T: PartialOrd + Copy>(value: T, min: Option<T>, max: Option<T>) -> T {
    let value = match min {
        Some(min) if value < min => min,
        _ => value,
    };
    match max {
        Some(max) if value > max => max,
        _ => value,
    }
}

fn clip(data: &ColumnData, min: Option<f64>, max: Option<f64>) -> ColumnData {
    match data {
        ColumnData::Int(cells) => {
            let min = min.map(|m| m.ceil() as i64);
            let max = max.map(|m| m.floor() as i64);
            ColumnData::Int(cells.iter().map(|c| c.map(|v| bound(v, min, max))).collect())
        }
        ColumnData::Float(cells) => {
            ColumnData::Float(cells.iter().map(|c| c.map(|v| bound(v, min, max))).collect())
        }
        // rejected by numeric()
        ColumnData::Text(_) => data.clone(),
    }
}
