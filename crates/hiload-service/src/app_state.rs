//! Shared application state for the hiload service.
//!
//! Owns the one metrics registry of the process. It is created here, at
//! startup, and reaches the middleware and handlers only through `AppState`.
//! Startup errors (e.g. duplicate metric names) are returned, not panicked.

use std::sync::Arc;

use hiload_core::error::Result;
use hiload_core::metrics::{ProcessCollector, Registry};

use crate::config::ServiceConfig;
use crate::obs::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    registry: Arc<Registry>,
    http: HttpMetrics,
    process: Arc<ProcessCollector>,
}

impl AppState {
    /// Build application state around a fresh registry.
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build application state on an existing registry. Fails if the HTTP or
    /// process metric names are already taken there.
    pub fn with_registry(cfg: ServiceConfig, registry: Arc<Registry>) -> Result<Self> {
        let http = HttpMetrics::register(&registry, cfg.metrics.summary_max_samples)?;

        let process = Arc::new(ProcessCollector::new());
        if cfg.metrics.process_metrics {
            registry.register(Arc::clone(&process))?;
        } else {
            tracing::info!("process metrics disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry, http, process }),
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.inner.http
    }

    pub fn process(&self) -> &ProcessCollector {
        &self.inner.process
    }
}
