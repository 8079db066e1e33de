//! Synthetic load endpoints.
//!
//! `/slow` waits on a timer, so other requests keep flowing while it sleeps.
//! CPU and allocation work runs on the blocking pool for the same reason.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hiload_core::error::HiloadError;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

use super::now_iso;
use crate::app_state::AppState;
use crate::error::ApiError;

pub const DEFAULT_ERROR_STATUS: u16 = 500;

pub async fn fast() -> Json<Value> {
    Json(json!({
        "message": "Fast endpoint",
        "delay": "0ms",
        "type": "instant_response",
        "timestamp": now_iso(),
    }))
}

pub async fn slow(State(state): State<AppState>) -> Json<Value> {
    let syn = &state.cfg().synthetic;
    let delay = rand::thread_rng().gen_range(syn.slow_min_ms..syn.slow_max_ms);
    tokio::time::sleep(Duration::from_millis(delay)).await;

    Json(json!({
        "message": "Slow endpoint",
        "delay": format!("{delay}ms"),
        "type": "simulated_delay",
        "timestamp": now_iso(),
    }))
}

/// Status for `/error/:code`: leading digits of `raw`, or 500 when missing,
/// zero, or outside 100..=599.
pub fn resolve_error_status(raw: Option<&str>) -> StatusCode {
    let code = raw
        .map(|s| {
            s.trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse::<u16>().ok())
        .filter(|c| (100..=599).contains(c))
        .unwrap_or(DEFAULT_ERROR_STATUS);
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn simulated_error(status: StatusCode) -> Response {
    let code = status.as_u16();
    (
        status,
        Json(json!({
            "error": true,
            "code": code,
            "message": format!("Simulated {code} error"),
            "timestamp": now_iso(),
        })),
    )
        .into_response()
}

pub async fn error_default() -> Response {
    simulated_error(resolve_error_status(None))
}

pub async fn error_with_code(Path(code): Path<String>) -> Response {
    simulated_error(resolve_error_status(Some(&code)))
}

fn spin(iterations: u64) -> f64 {
    let mut result = 0.0f64;
    for i in 0..iterations {
        let x = i as f64;
        result += x.sqrt() * x.sin();
    }
    result
}

pub async fn cpu_intensive(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let iterations = state.cfg().synthetic.cpu_iterations;
    let result = tokio::task::spawn_blocking(move || spin(iterations))
        .await
        .map_err(|e| HiloadError::Internal(format!("cpu task failed: {e}")))?;

    Ok(Json(json!({
        "message": "CPU intensive task completed",
        "result": format!("{result:.2}"),
        "timestamp": now_iso(),
    })))
}

#[derive(Serialize)]
struct Record {
    id: usize,
    data: String,
    timestamp: String,
}

pub async fn memory_intensive(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.cfg().synthetic.memory_items;
    let worker = state.clone();
    let (len, rss) = tokio::task::spawn_blocking(move || {
        let records: Vec<Record> = (0..items)
            .map(|id| Record {
                id,
                data: "x".repeat(100),
                timestamp: now_iso(),
            })
            .collect();
        // sample while the records are still alive
        let rss = worker.process().stats().memory.rss;
        (std::hint::black_box(records).len(), rss)
    })
    .await
    .map_err(|e| HiloadError::Internal(format!("memory task failed: {e}")))?;

    let memory_used = match rss {
        Some(bytes) => format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0),
        None => "unknown".to_string(),
    };

    Ok(Json(json!({
        "message": "Memory intensive task",
        "arraySize": len,
        "memory_used": memory_used,
        "timestamp": now_iso(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_parsing() {
        assert_eq!(resolve_error_status(None), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolve_error_status(Some("418")), StatusCode::IM_A_TEAPOT);
        assert_eq!(resolve_error_status(Some("404abc")), StatusCode::NOT_FOUND);
        assert_eq!(resolve_error_status(Some("abc")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolve_error_status(Some("0")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolve_error_status(Some("99")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolve_error_status(Some("600")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolve_error_status(Some("70000")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolve_error_status(Some("200")), StatusCode::OK);
    }

    #[test]
    fn spin_is_deterministic() {
        assert_eq!(spin(0), 0.0);
        assert_eq!(spin(1000), spin(1000));
    }
}
