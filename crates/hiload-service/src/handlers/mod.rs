//! Route handlers.
//!
//! `info` serves the static JSON pages; `synthetic` holds the load-shaping
//! endpoints (delay, simulated errors, CPU and memory pressure).

pub mod info;
pub mod synthetic;

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "code": 404,
            "message": "Not found",
            "timestamp": now_iso(),
        })),
    )
}
