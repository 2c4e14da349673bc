//! Model retraining handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::{Arc, PoisonError};
use tracing::{info, warn};

use domain_model::{train, TrainingReport};
use infra_store::{save_json_atomic, CsvReader};

use crate::dto::TrainResponse;
use crate::{error::ApiError, AppState};

/// Multipart field holding the uploaded CSV
pub const UPLOAD_FIELD: &str = "file";

pub const TRAINED_MESSAGE: &str = "Modelo entrenado con éxito";

/// Retrains the model on an uploaded CSV and starts serving it
pub async fn train_model(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TrainResponse>, ApiError> {
    info!("Training request received");

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            upload = Some(bytes);
            break;
        }
    }

    let Some(csv) = upload else {
        warn!("Training request without an uploaded file");
        return Err(ApiError::BadRequest(format!("missing multipart field '{UPLOAD_FIELD}'")));
    };
    info!(bytes = csv.len(), "Training data received");

    let report = tokio::task::spawn_blocking(move || retrain(&state, &csv)).await??;

    Ok(Json(TrainResponse {
        message: TRAINED_MESSAGE.to_string(),
        details: report.message(),
    }))
}

fn retrain(state: &AppState, csv: &[u8]) -> Result<TrainingReport, ApiError> {
    let settings = &state.settings;
    let _training = state.training.lock().unwrap_or_else(PoisonError::into_inner);

    let mut frame = CsvReader::new().read_frame(csv)?;
    if settings.train.apply_pipeline {
        frame = state.pipeline.run(frame)?;
    }

    let base = state.models.get_or_load().ok().and_then(|m| m.hyperparameters());
    let report = train(&frame, &settings.train, base).map_err(|e| ApiError::Training(e.to_string()))?;

    let path = settings.artifact_root().resolve(&settings.models.retrained_model_path);
    save_json_atomic(&path, &report.model)?;
    state.models.swap(Arc::new(report.model.clone()));

    info!(accuracy = report.accuracy, path = %path.display(), "Retrained model is now serving");
    Ok(report)
}
