use std::sync::atomic::{AtomicI64, Ordering};

use super::{Collector, MetricDesc, MetricFamily, MetricKind, Sample, SampleValue, SeriesMap};
use crate::error::Result;

/// Up/down gauge with a fixed label schema.
pub struct GaugeVec {
    series: SeriesMap<AtomicI64>,
}

impl GaugeVec {
    pub fn new(name: &str, help: &str, labels: &[&str]) -> Result<Self> {
        let desc = MetricDesc::new(MetricKind::Gauge, name, help, labels)?;
        Ok(Self { series: SeriesMap::new(desc) })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[&str]) {
        self.add(labels, 1);
    }

    /// Decrement by 1.
    pub fn dec(&self, labels: &[&str]) {
        self.add(labels, -1);
    }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[&str], v: i64) {
        self.series.with_series(
            labels,
            || AtomicI64::new(0),
            |g| {
                g.fetch_add(v, Ordering::Relaxed);
            },
        );
    }

    pub fn set(&self, labels: &[&str], v: i64) {
        self.series
            .with_series(labels, || AtomicI64::new(0), |g| g.store(v, Ordering::Relaxed));
    }

    /// Current value; 0 for a series never touched.
    pub fn get(&self, labels: &[&str]) -> i64 {
        self.series
            .read(labels, |g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl Collector for GaugeVec {
    fn descs(&self) -> Vec<MetricDesc> {
        vec![self.series.desc().clone()]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut samples = Vec::new();
        self.series.for_each_sorted(|labels, g| {
            samples.push(Sample {
                suffix: "",
                labels,
                value: SampleValue::Signed(g.load(Ordering::Relaxed)),
            });
        });
        vec![MetricFamily { desc: self.series.desc().clone(), samples }]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn inc_dec_pairs_return_to_zero() {
        let g = GaugeVec::new("in_progress", "in flight", &["method", "route"]).unwrap();
        g.inc(&["GET", "/slow"]);
        g.inc(&["GET", "/slow"]);
        assert_eq!(g.get(&["GET", "/slow"]), 2);
        g.dec(&["GET", "/slow"]);
        g.dec(&["GET", "/slow"]);
        assert_eq!(g.get(&["GET", "/slow"]), 0);

        // the series stays visible at 0 after it drains
        let fam = g.collect().remove(0);
        assert_eq!(fam.samples.len(), 1);
        assert_eq!(fam.samples[0].value, SampleValue::Signed(0));
    }

    #[test]
    fn set_overrides() {
        let g = GaugeVec::new("temp", "t", &[]).unwrap();
        g.add(&[], 10);
        g.set(&[], -3);
        assert_eq!(g.get(&[]), -3);
    }
}
