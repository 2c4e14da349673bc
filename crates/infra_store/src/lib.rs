//! Storage Infrastructure Layer
//!
//! File-backed storage for the scoring service:
//!
//! - **CSV record sets**: uploaded training data parsed into a [`core_kernel::Frame`]
//! - **Prediction log**: the shared append-only CSV of scored claims
//! - **Artifact persistence**: atomic JSON writes for retrained models

pub mod csv_reader;
pub mod prediction_log;
pub mod persist;
pub mod error;

pub use csv_reader::CsvReader;
pub use prediction_log::PredictionLog;
pub use persist::save_json_atomic;
pub use error::StoreError;
