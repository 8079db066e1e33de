//! Axum router wiring.
//!
//! Every route, and the 404 fallback, runs inside the request
//! instrumentation layer; `/metrics` is instrumented like any other route.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, handlers, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::info::root))
        .route("/hello", get(handlers::info::hello))
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .route("/fast", get(handlers::synthetic::fast))
        .route("/slow", get(handlers::synthetic::slow))
        .route("/error", get(handlers::synthetic::error_default))
        .route("/error/:code", get(handlers::synthetic::error_with_code))
        .route("/cpu-intensive", get(handlers::synthetic::cpu_intensive))
        .route("/memory-intensive", get(handlers::synthetic::memory_intensive))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::middleware::track_requests,
        ))
        .with_state(state)
}
