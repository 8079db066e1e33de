//! Request instrumentation layer.
//!
//! Runs around every route (and the fallback). Labels use the matched route
//! template, e.g. `/error/:code`, never the literal path.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::app_state::AppState;

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

pub async fn track_requests(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().as_str().to_owned();
    let route = matched
        .as_ref()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());

    let metrics = state.http_metrics();
    let start = Instant::now();
    // released on every exit path, including this future being dropped
    let in_progress = metrics.track_in_progress(&method, &route);

    let response = next.run(req).await;

    drop(in_progress);
    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();
    metrics.record(&method, &route, status, elapsed);

    if status >= 500 {
        tracing::warn!(%method, %route, status, elapsed, "request completed with server error");
    } else {
        tracing::debug!(%method, %route, status, elapsed, "request completed");
    }

    response
}
