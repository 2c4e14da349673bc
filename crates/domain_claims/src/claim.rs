//! Inbound claim record

use serde::{Deserialize, Serialize};

use core_kernel::{ColumnData, Frame};
use crate::error::ClaimError;

/// Policy type excluded from model scoring
pub const EXCLUDED_POLICY_TYPE: i64 = 4;

/// One insurance claim to be scored
///
/// Field names are part of the public contract: they are the JSON keys of the
/// predict request, the column names of the frame fed to the pipeline, and
/// the headers of the prediction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim identifier
    pub claim_id: i64,
    /// Vehicle brand
    pub marca_vehiculo: String,
    /// Vehicle age in years
    pub antiguedad_vehiculo: i64,
    /// Policy type code
    pub tipo_poliza: i64,
    /// Workshop code
    pub taller: i64,
    /// Number of parts to repair
    pub partes_a_reparar: i64,
    /// Number of parts to replace
    pub partes_a_reemplazar: i64,
}

impl Claim {
    /// Claims under the excluded policy type never reach the model
    pub fn is_excluded_from_scoring(&self) -> bool {
        self.tipo_poliza == EXCLUDED_POLICY_TYPE
    }

    /// Builds the one-row frame the preprocessing pipeline starts from
    pub fn to_frame(&self) -> Result<Frame, ClaimError> {
        let int = |v: i64| ColumnData::Int(vec![Some(v)]);

        let frame = Frame::from_columns(vec![
            ("claim_id", int(self.claim_id)),
            ("marca_vehiculo", ColumnData::Text(vec![Some(self.marca_vehiculo.clone())])),
            ("antiguedad_vehiculo", int(self.antiguedad_vehiculo)),
            ("tipo_poliza", int(self.tipo_poliza)),
            ("taller", int(self.taller)),
            ("partes_a_reparar", int(self.partes_a_reparar)),
            ("partes_a_reemplazar", int(self.partes_a_reemplazar)),
        ])?;

        Ok(frame)
    }
}
