//! Request observability.
//!
//! `metrics` owns the HTTP instruments registered in the shared registry;
//! `middleware` feeds them from every request.

pub mod metrics;
pub mod middleware;

pub use metrics::{HttpMetrics, InProgressGuard};
