//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness plus uptime and memory
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use hiload_core::metrics::TEXT_CONTENT_TYPE;

use crate::app_state::AppState;
use crate::error::ApiError;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let stats = state.process().stats();
    Json(json!({
        "status": "healthy",
        "service": state.cfg().service.name,
        "uptime": stats.uptime_seconds,
        "memory": stats.memory,
        "metrics_endpoint": "/metrics",
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.registry().render() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics exposition failed");
            ApiError(e).into_response()
        }
    }
}
