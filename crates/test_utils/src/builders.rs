//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use fake::faker::lorem::en::Word;
use fake::Fake;

use core_kernel::{ColumnData, Frame, Scalar};
use domain_claims::Claim;

use crate::fixtures::ClaimFixtures;

/// Builder for claims
pub struct ClaimBuilder {
    claim: Claim,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// Starts from the reference claim
    pub fn new() -> Self {
        Self {
            claim: ClaimFixtures::ford(),
        }
    }

    /// Starts from random field values
    pub fn random() -> Self {
        Self {
            claim: Claim {
                claim_id: (1..1_000_000i64).fake(),
                marca_vehiculo: Word().fake(),
                antiguedad_vehiculo: (0..30i64).fake(),
                tipo_poliza: (1..6i64).fake(),
                taller: (0..3i64).fake(),
                partes_a_reparar: (0..12i64).fake(),
                partes_a_reemplazar: (0..12i64).fake(),
            },
        }
    }

    pub fn claim_id(mut self, claim_id: i64) -> Self {
        self.claim.claim_id = claim_id;
        self
    }

    pub fn marca_vehiculo(mut self, marca: &str) -> Self {
        self.claim.marca_vehiculo = marca.to_string();
        self
    }

    pub fn antiguedad_vehiculo(mut self, years: i64) -> Self {
        self.claim.antiguedad_vehiculo = years;
        self
    }

    pub fn tipo_poliza(mut self, tipo: i64) -> Self {
        self.claim.tipo_poliza = tipo;
        self
    }

    pub fn partes(mut self, a_reparar: i64, a_reemplazar: i64) -> Self {
        self.claim.partes_a_reparar = a_reparar;
        self.claim.partes_a_reemplazar = a_reemplazar;
        self
    }

    pub fn build(self) -> Claim {
        self.claim
    }
}

/// Builder for frames whose columns are given as scalars
#[derive(Default)]
pub struct FrameBuilder {
    columns: Vec<(String, ColumnData)>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(mut self, name: &str, cells: &[Option<i64>]) -> Self {
        self.columns.push((name.to_string(), ColumnData::Int(cells.to_vec())));
        self
    }

    pub fn float(mut self, name: &str, cells: &[Option<f64>]) -> Self {
        self.columns.push((name.to_string(), ColumnData::Float(cells.to_vec())));
        self
    }

    pub fn text(mut self, name: &str, cells: &[Option<&str>]) -> Self {
        self.columns.push((
            name.to_string(),
            ColumnData::Text(cells.iter().map(|c| c.map(str::to_string)).collect()),
        ));
        self
    }

    /// Single-row column from a scalar
    pub fn scalar(mut self, name: &str, value: impl Into<Scalar>) -> Self {
        self.columns.push((name.to_string(), ColumnData::repeat(&value.into(), 1)));
        self
    }

    pub fn build(self) -> Frame {
        Frame::from_columns(self.columns).expect("Builder columns must share a row count")
    }
}

/// One-row frame holding every column the validator requires
pub fn valid_feature_frame() -> Frame {
    FrameBuilder::new()
        .float("log_total_piezas", &[Some(1.609)])
        .int("marca_vehiculo_encoded", &[Some(1)])
        .int("valor_vehiculo", &[Some(18_500)])
        .int("valor_por_pieza", &[Some(4_625)])
        .int("antiguedad_vehiculo", &[Some(5)])
        .build()
}
