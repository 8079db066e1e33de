use std::sync::atomic::{AtomicU64, Ordering};

use super::{Collector, MetricDesc, MetricFamily, MetricKind, Sample, SampleValue, SeriesMap};
use crate::error::Result;

/// Monotonic counter with a fixed label schema.
pub struct CounterVec {
    series: SeriesMap<AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &str, help: &str, labels: &[&str]) -> Result<Self> {
        let desc = MetricDesc::new(MetricKind::Counter, name, help, labels)?;
        Ok(Self { series: SeriesMap::new(desc) })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[&str]) {
        self.inc_by(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn inc_by(&self, labels: &[&str], v: u64) {
        self.series.with_series(
            labels,
            || AtomicU64::new(0),
            |c| {
                c.fetch_add(v, Ordering::Relaxed);
            },
        );
    }

    /// Current value; 0 for a series never observed.
    pub fn get(&self, labels: &[&str]) -> u64 {
        self.series
            .read(labels, |c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Number of label combinations observed so far.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

impl Collector for CounterVec {
    fn descs(&self) -> Vec<MetricDesc> {
        vec![self.series.desc().clone()]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut samples = Vec::new();
        self.series.for_each_sorted(|labels, c| {
            samples.push(Sample {
                suffix: "",
                labels,
                value: SampleValue::Unsigned(c.load(Ordering::Relaxed)),
            });
        });
        vec![MetricFamily { desc: self.series.desc().clone(), samples }]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counts_per_label_tuple() {
        let c = CounterVec::new("reqs_total", "requests", &["method", "route"]).unwrap();
        c.inc(&["GET", "/a"]);
        c.inc(&["GET", "/a"]);
        c.inc_by(&["POST", "/a"], 5);

        assert_eq!(c.get(&["GET", "/a"]), 2);
        assert_eq!(c.get(&["POST", "/a"]), 5);
        assert_eq!(c.get(&["GET", "/b"]), 0);
        assert_eq!(c.series_count(), 2);
    }

    #[test]
    fn wrong_arity_is_dropped() {
        let c = CounterVec::new("reqs_total", "requests", &["method", "route"]).unwrap();
        c.inc(&["GET"]);
        assert_eq!(c.series_count(), 0);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let c = Arc::new(CounterVec::new("reqs_total", "requests", &["route"]).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        c.inc(&["/fast"]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.get(&["/fast"]), 8000);
    }

    #[test]
    fn collect_sorts_series() {
        let c = CounterVec::new("reqs_total", "requests", &["route"]).unwrap();
        c.inc(&["/b"]);
        c.inc(&["/a"]);
        let fam = c.collect().remove(0);
        let routes: Vec<_> = fam.samples.iter().map(|s| s.labels[0].1.as_str()).collect();
        assert_eq!(routes, vec!["/a", "/b"]);
        assert_eq!(fam.samples[0].labels[0].0, "route");
    }
}
