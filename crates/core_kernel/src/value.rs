//! Scalar values and element types
//!
//! Every cell of a [`Frame`](crate::Frame) is one of three element types.
//! Missing cells are modelled as `None` at the column level, so a [`Scalar`]
//! is always a present value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 64-bit floating point
    Float,
    /// 64-bit signed integer
    Int,
    /// UTF-8 text
    Text,
}

impl DType {
    /// Returns true for float and integer columns
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Float | DType::Int)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Float => "float",
            DType::Int => "int",
            DType::Text => "text",
        };
        f.write_str(name)
    }
}

/// A single present value
///
/// Deserializes from a bare JSON scalar: integers become [`Scalar::Int`],
/// other numbers [`Scalar::Float`], strings [`Scalar::Text`]. `null`,
/// booleans, arrays and objects are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Element type this value naturally belongs to
    pub fn dtype(&self) -> DType {
        match self {
            Scalar::Int(_) => DType::Int,
            Scalar::Float(_) => DType::Float,
            Scalar::Text(_) => DType::Text,
        }
    }

    /// Numeric view of the value, `None` for text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Text(_) => None,
        }
    }

    /// Integer view of the value
    ///
    /// Floats qualify only when they are finite and integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            Scalar::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Text view of the value, `None` for numbers
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}
