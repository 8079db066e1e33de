use axum::Json;
use serde_json::{json, Value};

use super::now_iso;

pub const ENDPOINTS: [&str; 9] = [
    "/hello",
    "/health",
    "/metrics",
    "/fast",
    "/slow",
    "/error/:code?",
    "/cpu-intensive",
    "/memory-intensive",
    "/",
];

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to High Load System API",
        "status": 200,
        "endpoints": ENDPOINTS,
        "monitoring": {
            "requests_per_second": "rate(http_requests_total[5m])",
            "average_response_time": "rate(http_request_duration_seconds_sum[5m]) / rate(http_request_duration_seconds_count[5m])",
            "latency_p95": "histogram_quantile(0.95, rate(http_request_duration_seconds_bucket[5m]))",
        },
    }))
}

pub async fn hello() -> Json<Value> {
    Json(json!({
        "message": "Hello High Load System",
        "status": 200,
        "timestamp": now_iso(),
        "metrics_available": "/metrics",
    }))
}
