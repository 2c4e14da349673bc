//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;

use core_kernel::{ColumnData, Frame, Scalar};
use domain_claims::Claim;

/// Strategy for brands, known to the encoding step or not
pub fn brand_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ford".to_string()),
        Just("toyota".to_string()),
        Just("kia".to_string()),
        Just("renault".to_string()),
        "[a-z]{3,10}",
    ]
}

/// Strategy for well-formed claims of any policy type
pub fn claim_strategy() -> impl Strategy<Value = Claim> {
    (
        1i64..1_000_000,
        brand_strategy(),
        0i64..40,
        0i64..8,
        0i64..5,
        0i64..20,
        0i64..20,
    )
        .prop_map(
            |(claim_id, marca_vehiculo, antiguedad_vehiculo, tipo_poliza, taller, partes_a_reparar, partes_a_reemplazar)| {
                Claim {
                    claim_id,
                    marca_vehiculo,
                    antiguedad_vehiculo,
                    tipo_poliza,
                    taller,
                    partes_a_reparar,
                    partes_a_reemplazar,
                }
            },
        )
}

/// Strategy for claims under the excluded policy type
pub fn excluded_claim_strategy() -> impl Strategy<Value = Claim> {
    claim_strategy().prop_map(|claim| Claim {
        tipo_poliza: 4,
        ..claim
    })
}

/// Strategy for a scalar of any element type
pub fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        (-1000i64..1000).prop_map(Scalar::Int),
        (-1000.0f64..1000.0).prop_map(Scalar::Float),
        "[a-z]{1,8}".prop_map(Scalar::Text),
    ]
}

/// Strategy for frames with one int, one float and one text column,
/// each with scattered missing cells
pub fn sparse_frame_strategy() -> impl Strategy<Value = Frame> {
    (1usize..12).prop_flat_map(|rows| {
        (
            prop::collection::vec(prop::option::of(-100i64..100), rows),
            prop::collection::vec(prop::option::of(-100.0f64..100.0), rows),
            prop::collection::vec(prop::option::of("[a-z]{1,6}"), rows),
        )
            .prop_map(|(ints, floats, texts)| {
                Frame::from_columns(vec![
                    ("entero", ColumnData::Int(ints)),
                    ("decimal", ColumnData::Float(floats)),
                    ("texto", ColumnData::Text(texts)),
                ])
                .expect("Columns share a row count")
            })
    })
}
