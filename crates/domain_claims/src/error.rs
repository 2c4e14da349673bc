//! Claims domain errors

use core_kernel::FrameError;
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Failed to build claim record: {0}")]
    Record(#[from] FrameError),
}
