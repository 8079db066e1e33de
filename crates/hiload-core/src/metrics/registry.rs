//! Metric registry.
//!
//! Holds collectors in registration order and enforces globally unique metric
//! names. Observations go straight to the instruments and never touch the
//! registry lock; the lock is only taken to register or to snapshot the
//! collector list at the start of a scrape.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::{encode_text, Collector, MetricFamily};
use crate::error::{HiloadError, Result};

#[derive(Default)]
struct Inner {
    names: HashSet<String>,
    collectors: Vec<Arc<dyn Collector>>,
}

#[derive(Default)]
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. Fails if any of its names is already taken;
    /// on failure nothing is registered.
    /// Returns the same `Arc` so callers can keep a typed handle.
    pub fn register<C>(&self, collector: Arc<C>) -> Result<Arc<C>>
    where
        C: Collector + 'static,
    {
        let names: Vec<String> = collector.descs().into_iter().map(|d| d.name).collect();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        let mut seen = HashSet::new();
        for n in &names {
            if inner.names.contains(n) || !seen.insert(n.as_str()) {
                return Err(HiloadError::DuplicateMetricName(n.clone()));
            }
        }

        inner.names.extend(names);
        inner.collectors.push(Arc::clone(&collector) as Arc<dyn Collector>);
        Ok(collector)
    }

    /// Whether a metric with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.names.contains(name)
    }

    /// Lazily collect all families. Each collector is asked for its values
    /// only when the iterator reaches it.
    pub fn collect(&self) -> impl Iterator<Item = MetricFamily> {
        let collectors: Vec<Arc<dyn Collector>> = {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            inner.collectors.clone()
        };
        collectors.into_iter().flat_map(|c| c.collect())
    }

    /// All families, in registration order.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.collect().collect()
    }

    /// Render everything in Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        encode_text(self.collect())
    }
}
