//! Special endpoint handlers for the proxy.
//!
//! - `/health` - liveness check with uptime and version
//! - `/metrics` - Prometheus text export of the transformation counters
//!
//! Both are answered locally and never reach the origin.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header;

use super::AppState;

/// Prometheus text exposition content type
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Generate response for /health endpoint.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = serde_json::json!({
        "status": "ok",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    });
    Json(body).into_response()
}

/// Generate response for /metrics endpoint.
pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.export_prometheus(),
    )
        .into_response()
}
