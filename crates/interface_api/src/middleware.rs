//! API middleware

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, Instrument};
use uuid::Uuid;

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Audit logging middleware
///
/// Tags every request with a UUID, runs it inside a span carrying that id,
/// and logs method, URI, status and duration once it completes.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Instant::now();
    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;
    let duration = start.elapsed();

    let status = response.status();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "API request"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
