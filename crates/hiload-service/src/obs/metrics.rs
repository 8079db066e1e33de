//! HTTP request metrics.
//!
//! Five instruments registered once at startup. Latency goes into both a
//! histogram and a summary; dashboards read the fixed bucket and quantile
//! sets below, so they are constants rather than configuration.

use std::sync::Arc;

use hiload_core::error::Result;
use hiload_core::metrics::{CounterVec, GaugeVec, HistogramVec, Registry, SummaryVec};

pub const DURATION_BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 1.5, 2.0, 5.0];
pub const SUMMARY_QUANTILES: [f64; 3] = [0.5, 0.95, 0.99];

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const REQUEST_DURATION_SUMMARY: &str = "http_request_duration_summary_seconds";
pub const REQUESTS_IN_PROGRESS: &str = "http_requests_in_progress";
pub const ERRORS_TOTAL: &str = "http_errors_total";

const REQUEST_LABELS: [&str; 3] = ["method", "route", "status_code"];
const IN_PROGRESS_LABELS: [&str; 2] = ["method", "route"];

#[derive(Clone)]
pub struct HttpMetrics {
    pub requests_total: Arc<CounterVec>,
    pub request_duration: Arc<HistogramVec>,
    pub request_duration_summary: Arc<SummaryVec>,
    pub requests_in_progress: Arc<GaugeVec>,
    pub errors_total: Arc<CounterVec>,
}

impl HttpMetrics {
    /// Build and register all request instruments. Fails on a name clash.
    pub fn register(registry: &Registry, summary_max_samples: usize) -> Result<Self> {
        let requests_total = registry.register(Arc::new(CounterVec::new(
            REQUESTS_TOTAL,
            "Total number of HTTP requests",
            &REQUEST_LABELS,
        )?))?;
        let request_duration = registry.register(Arc::new(HistogramVec::new(
            REQUEST_DURATION,
            "Duration of HTTP requests in seconds",
            &REQUEST_LABELS,
            &DURATION_BUCKETS,
        )?))?;
        let request_duration_summary = registry.register(Arc::new(SummaryVec::new(
            REQUEST_DURATION_SUMMARY,
            "Summary of HTTP request durations in seconds",
            &REQUEST_LABELS,
            &SUMMARY_QUANTILES,
            summary_max_samples,
        )?))?;
        let requests_in_progress = registry.register(Arc::new(GaugeVec::new(
            REQUESTS_IN_PROGRESS,
            "Number of HTTP requests currently in progress",
            &IN_PROGRESS_LABELS,
        )?))?;
        let errors_total = registry.register(Arc::new(CounterVec::new(
            ERRORS_TOTAL,
            "Total number of HTTP errors (4xx, 5xx)",
            &REQUEST_LABELS,
        )?))?;

        Ok(Self {
            requests_total,
            request_duration,
            request_duration_summary,
            requests_in_progress,
            errors_total,
        })
    }

    /// Mark a request as in flight. The returned guard undoes it on drop.
    pub fn track_in_progress(&self, method: &str, route: &str) -> InProgressGuard {
        self.requests_in_progress.inc(&[method, route]);
        InProgressGuard {
            gauge: Arc::clone(&self.requests_in_progress),
            method: method.to_string(),
            route: route.to_string(),
        }
    }

    /// Record a finished request.
    pub fn record(&self, method: &str, route: &str, status: u16, elapsed_secs: f64) {
        let code = status.to_string();
        let labels = [method, route, code.as_str()];

        self.request_duration.observe(&labels, elapsed_secs);
        self.request_duration_summary.observe(&labels, elapsed_secs);
        self.requests_total.inc(&labels);
        if is_error_status(status) {
            self.errors_total.inc(&labels);
        }
    }
}

/// 4xx and 5xx count as errors.
pub fn is_error_status(status: u16) -> bool {
    status >= 400
}

/// Decrements the in-progress gauge exactly once, however the request ends.
pub struct InProgressGuard {
    gauge: Arc<GaugeVec>,
    method: String,
    route: String,
}

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        self.gauge.dec(&[self.method.as_str(), self.route.as_str()]);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn metrics() -> (Registry, HttpMetrics) {
        let reg = Registry::new();
        let m = HttpMetrics::register(&reg, 128).unwrap();
        (reg, m)
    }

    #[test]
    fn registers_five_families() {
        let (reg, _m) = metrics();
        for name in [REQUESTS_TOTAL, REQUEST_DURATION, REQUEST_DURATION_SUMMARY, REQUESTS_IN_PROGRESS, ERRORS_TOTAL] {
            assert!(reg.contains(name), "{name} missing");
        }
        // second registration on the same registry collides
        assert!(HttpMetrics::register(&reg, 128).is_err());
    }

    #[test]
    fn guard_pairs_inc_and_dec() {
        let (_reg, m) = metrics();
        {
            let _g = m.track_in_progress("GET", "/slow");
            assert_eq!(m.requests_in_progress.get(&["GET", "/slow"]), 1);
        }
        assert_eq!(m.requests_in_progress.get(&["GET", "/slow"]), 0);
    }

    #[test]
    fn errors_only_counted_from_400() {
        let (_reg, m) = metrics();
        m.record("GET", "/fast", 200, 0.001);
        m.record("GET", "/fast", 399, 0.001);
        m.record("GET", "/error/:code", 400, 0.001);
        m.record("GET", "/error/:code", 503, 0.001);

        assert_eq!(m.errors_total.get(&["GET", "/fast", "200"]), 0);
        assert_eq!(m.errors_total.get(&["GET", "/fast", "399"]), 0);
        assert_eq!(m.errors_total.get(&["GET", "/error/:code", "400"]), 1);
        assert_eq!(m.errors_total.get(&["GET", "/error/:code", "503"]), 1);
        assert_eq!(m.requests_total.get(&["GET", "/fast", "200"]), 1);
    }

    #[test]
    fn latency_lands_in_histogram_and_summary() {
        let (_reg, m) = metrics();
        m.record("GET", "/slow", 200, 1.25);
        let h = m.request_duration.get(&["GET", "/slow", "200"]).unwrap();
        assert_eq!(h.count, 1);
        assert_eq!(h.mean(), Some(1.25));
        let s = m.request_duration_summary.get(&["GET", "/slow", "200"]).unwrap();
        assert_eq!(s.quantiles[0], (0.5, 1.25));
    }
}
