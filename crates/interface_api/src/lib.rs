//! HTTP API Layer
//!
//! This crate provides the REST API for the claim scoring service using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: scoring, retraining, health and documentation endpoints
//! - **Middleware**: per-request id and audit logging
//! - **DTOs**: request/response bodies
//! - **Error Handling**: every failure maps to a status and `{"detail": ...}`
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::from_settings(settings)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod telemetry;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_model::{ModelHandle, ModelLoader};
use domain_pipeline::FullPipeline;
use infra_store::{PredictionLog, StoreError};

use crate::config::Settings;
use crate::handlers::{docs, health, predict, train};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub pipeline: Arc<FullPipeline>,
    pub models: Arc<ModelHandle>,
    pub prediction_log: Arc<PredictionLog>,
    /// Held for a whole retrain so fit, persist and swap are not interleaved
    pub training: Arc<Mutex<()>>,
}

impl AppState {
    /// Wires the service components from settings
    ///
    /// Opens the prediction log; the model is loaded on first use.
    pub fn from_settings(settings: Settings) -> Result<Self, StoreError> {
        let root = settings.artifact_root();
        let pipeline = FullPipeline::new(root.clone(), settings.pipeline.clone());
        let models = ModelHandle::new(ModelLoader::new(root.clone(), settings.models.model_path.clone()));
        let prediction_log = PredictionLog::open(settings.prediction_log_path())?;

        Ok(Self {
            settings: Arc::new(settings),
            pipeline: Arc::new(pipeline),
            models: Arc::new(models),
            prediction_log: Arc::new(prediction_log),
            training: Arc::new(Mutex::new(())),
        })
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(docs::root))
        .route("/openapi", get(docs::openapi))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let api_routes = Router::new()
        .route("/predict", post(predict::predict_claim))
        .route("/predict/", post(predict::predict_claim))
        .route("/train", post(train::train_model))
        .route("/train/", post(train::train_model));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
