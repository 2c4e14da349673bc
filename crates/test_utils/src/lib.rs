//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim scoring test suite.
//!
//! # Modules
//!
//! - `fixtures`: Reference claims, shipped artifacts, and temporary artifact workspaces
//! - `builders`: Builder patterns for claims and frames
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use generators::*;
