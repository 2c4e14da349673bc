//! Welcome and API documentation handlers

use axum::{extract::State, http::header, response::IntoResponse, Json};

use crate::dto::MessageResponse;
use crate::{error::ApiError, AppState};

pub const WELCOME_MESSAGE: &str = "Bienvenido al API de predicción de siniestros de HDI";

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Serves the configured OpenAPI document as stored on disk
pub async fn openapi(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let doc = state
        .settings
        .api
        .doc
        .as_deref()
        .ok_or_else(|| ApiError::NotFound("no OpenAPI document configured".to_string()))?;
    let path = state.settings.artifact_root().resolve(doc);

    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ApiError::NotFound(format!("{}: {e}", path.display())))?;

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => "application/yaml",
        _ => "application/json",
    };

    Ok(([(header::CONTENT_TYPE, content_type)], body))
}
