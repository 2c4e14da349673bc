//! Claim scoring handler

use axum::{extract::State, Json};
use chrono::Local;
use std::time::Instant;
use tracing::info;

use domain_claims::{Claim, Prediction, PredictionLogEntry};

use crate::dto::PredictResponse;
use crate::extract::ApiJson;
use crate::{error::ApiError, AppState};

/// Scores one claim and appends it to the prediction log
///
/// Model loading, preprocessing and inference run on the blocking pool.
/// Claims under the excluded policy type are answered with `-1` without
/// invoking the model. Nothing is logged when any stage fails.
pub async fn predict_claim(
    State(state): State<AppState>,
    ApiJson(claim): ApiJson<Claim>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = Instant::now();
    info!(claim_id = claim.claim_id, "Prediction request received");

    let prediction = {
        let state = state.clone();
        let claim = claim.clone();
        tokio::task::spawn_blocking(move || score(&state, &claim)).await??
    };

    let elapsed = start.elapsed();
    let entry = PredictionLogEntry::new(&claim, prediction, elapsed, Local::now());
    state.prediction_log.append(&entry)?;

    info!(
        claim_id = claim.claim_id,
        prediction = prediction.value(),
        execution_time = entry.execution_time,
        "Prediction completed"
    );

    Ok(Json(PredictResponse { prediccion: prediction }))
}

fn score(state: &AppState, claim: &Claim) -> Result<Prediction, ApiError> {
    let model = state.models.get_or_load().map_err(ApiError::ModelLoad)?;

    let frame = claim
        .to_frame()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let features = state.pipeline.run(frame)?;

    if claim.is_excluded_from_scoring() {
        info!(tipo_poliza = claim.tipo_poliza, "Policy type excluded from scoring");
        return Ok(Prediction::EXCLUDED);
    }

    let labels = model.predict(&features).map_err(ApiError::Prediction)?;
    labels
        .first()
        .copied()
        .map(Prediction::new)
        .ok_or_else(|| ApiError::Internal("model returned no label".to_string()))
}
