//! Claims Domain
//!
//! This crate holds the records the scoring service receives and produces:
//!
//! ```text
//! Claim -> Frame -> (pipeline, model) -> Prediction -> PredictionLogEntry
//! ```
//!
//! Claims whose policy type is [`EXCLUDED_POLICY_TYPE`] are never sent to the
//! model; they always score [`Prediction::EXCLUDED`].

pub mod claim;
pub mod prediction;
pub mod error;

pub use claim::{Claim, EXCLUDED_POLICY_TYPE};
pub use prediction::{Prediction, PredictionLogEntry, TIMESTAMP_FORMAT};
pub use error::ClaimError;
