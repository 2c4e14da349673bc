//! Predictions and the prediction log entry

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::claim::Claim;

/// Timestamp layout of the prediction log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Predicted class label for one claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction(i64);

impl Prediction {
    /// Sentinel returned for claims excluded from scoring
    pub const EXCLUDED: Prediction = Prediction(-1);

    pub fn new(label: i64) -> Self {
        Self(label)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_excluded(&self) -> bool {
        *self == Self::EXCLUDED
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the append-only prediction log
///
/// Field order is the column order of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    pub timestamp: String,
    pub claim_id: i64,
    pub marca_vehiculo: String,
    pub antiguedad_vehiculo: i64,
    pub tipo_poliza: i64,
    pub taller: i64,
    pub partes_a_reparar: i64,
    pub partes_a_reemplazar: i64,
    pub prediction: i64,
    /// Seconds, rounded to four decimals
    pub execution_time: f64,
}

impl PredictionLogEntry {
    /// Column headers, in log order
    pub const COLUMNS: [&'static str; 10] = [
        "timestamp",
        "claim_id",
        "marca_vehiculo",
        "antiguedad_vehiculo",
        "tipo_poliza",
        "taller",
        "partes_a_reparar",
        "partes_a_reemplazar",
        "prediction",
        "execution_time",
    ];

    /// Records a completed prediction
    pub fn new<Tz>(claim: &Claim, prediction: Prediction, elapsed: Duration, at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            claim_id: claim.claim_id,
            marca_vehiculo: claim.marca_vehiculo.clone(),
            antiguedad_vehiculo: claim.antiguedad_vehiculo,
            tipo_poliza: claim.tipo_poliza,
            taller: claim.taller,
            partes_a_reparar: claim.partes_a_reparar,
            partes_a_reemplazar: claim.partes_a_reemplazar,
            prediction: prediction.value(),
            execution_time: round_seconds(elapsed),
        }
    }
}

fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 10_000.0).round() / 10_000.0
}
