//! Request and response bodies
//!
//! The predict request body is [`domain_claims::Claim`] itself.

use serde::{Deserialize, Serialize};

use domain_claims::Prediction;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediccion: Prediction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResponse {
    pub message: String,
    pub details: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
