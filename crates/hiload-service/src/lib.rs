//! hiload service library entry.
//!
//! This crate wires config, the metrics registry, request instrumentation,
//! and the demo route handlers into an axum application. It is consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
