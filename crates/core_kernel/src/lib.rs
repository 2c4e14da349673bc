//! Core Kernel - Foundational types for the claim scoring service
//!
//! This crate provides the building blocks shared by every other crate:
//! - [`Frame`], the tabular record set threaded through the preprocessing pipeline
//! - [`Scalar`] and [`DType`], the cell values and element types of a frame
//! - [`FrameError`], the error type of frame operations
//! - [`ArtifactRoot`] and [`read_json`], shared access to persisted JSON artifacts

pub mod value;
pub mod frame;
pub mod error;
pub mod artifact;

pub use value::{DType, Scalar};
pub use frame::{Column, ColumnData, Frame};
pub use error::FrameError;
pub use artifact::{check_version, read_json, read_versioned_json, ArtifactError, ArtifactRoot};
