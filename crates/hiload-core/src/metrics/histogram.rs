use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{
    atomic_f64_add, atomic_f64_load, Collector, MetricDesc, MetricFamily, MetricKind, Sample,
    SampleValue, SeriesMap,
};
use crate::error::{HiloadError, Result};

struct AtomicHistogram {
    count: AtomicU64,
    /// f64 bits
    sum: AtomicU64,
    /// Per-bucket (non-cumulative) counts; cumulated at render time.
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0f64.to_bits()),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

/// Point-in-time read of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    /// `(upper_bound, cumulative_count)`; the `+Inf` bucket equals `count`.
    pub buckets: Vec<(f64, u64)>,
}

impl HistogramSnapshot {
    /// Average observation, derived from sum and count.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Fixed-bucket histogram with a fixed label schema.
pub struct HistogramVec {
    bounds: Arc<[f64]>,
    series: SeriesMap<AtomicHistogram>,
}

impl HistogramVec {
    /// `buckets` are upper bounds; they must be finite and strictly increasing.
    pub fn new(name: &str, help: &str, labels: &[&str], buckets: &[f64]) -> Result<Self> {
        let desc = MetricDesc::new(MetricKind::Histogram, name, help, labels)?;
        if buckets.is_empty() {
            return Err(HiloadError::InvalidMetric(format!("{name}: no buckets")));
        }
        if buckets.iter().any(|b| !b.is_finite()) {
            return Err(HiloadError::InvalidMetric(format!(
                "{name}: bucket bounds must be finite (+Inf is implicit)"
            )));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HiloadError::InvalidMetric(format!(
                "{name}: buckets must be strictly increasing"
            )));
        }
        Ok(Self {
            bounds: buckets.into(),
            series: SeriesMap::new(desc),
        })
    }

    pub fn buckets(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one value (seconds for latency histograms).
    pub fn observe(&self, labels: &[&str], v: f64) {
        let n = self.bounds.len();
        // first bucket whose upper bound holds v; n means +Inf only
        let idx = self.bounds.iter().position(|&b| v <= b).unwrap_or(n);
        self.series.with_series(
            labels,
            || AtomicHistogram::new(n),
            |h| {
                if let Some(b) = h.buckets.get(idx) {
                    b.fetch_add(1, Ordering::Relaxed);
                }
                atomic_f64_add(&h.sum, v);
                h.count.fetch_add(1, Ordering::Relaxed);
            },
        );
    }

    pub fn get(&self, labels: &[&str]) -> Option<HistogramSnapshot> {
        self.series.read(labels, |h| self.snapshot(h))
    }

    fn snapshot(&self, h: &AtomicHistogram) -> HistogramSnapshot {
        let mut cumulative = 0u64;
        let buckets = self
            .bounds
            .iter()
            .zip(h.buckets.iter())
            .map(|(&le, c)| {
                cumulative += c.load(Ordering::Relaxed);
                (le, cumulative)
            })
            .collect();
        // count is bumped last, so it never trails the buckets it covers
        let count = h.count.load(Ordering::Relaxed).max(cumulative);
        HistogramSnapshot {
            count,
            sum: atomic_f64_load(&h.sum),
            buckets,
        }
    }
}

impl Collector for HistogramVec {
    fn descs(&self) -> Vec<MetricDesc> {
        vec![self.series.desc().clone()]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut samples = Vec::new();
        self.series.for_each_sorted(|labels, h| {
            let snap = self.snapshot(h);
            for (le, c) in &snap.buckets {
                let mut l = labels.clone();
                l.push(("le".to_string(), super::encode::format_float(*le)));
                samples.push(Sample { suffix: "_bucket", labels: l, value: SampleValue::Unsigned(*c) });
            }
            let mut inf = labels.clone();
            inf.push(("le".to_string(), "+Inf".to_string()));
            samples.push(Sample {
                suffix: "_bucket",
                labels: inf,
                value: SampleValue::Unsigned(snap.count),
            });
            samples.push(Sample {
                suffix: "_sum",
                labels: labels.clone(),
                value: SampleValue::Float(snap.sum),
            });
            samples.push(Sample {
                suffix: "_count",
                labels,
                value: SampleValue::Unsigned(snap.count),
            });
        });
        vec![MetricFamily { desc: self.series.desc().clone(), samples }]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 1.5, 2.0, 5.0];

    fn hist() -> HistogramVec {
        HistogramVec::new("dur_seconds", "duration", &["route"], &BUCKETS).unwrap()
    }

    #[test]
    fn buckets_are_cumulative() {
        let h = hist();
        h.observe(&["/x"], 0.003);
        h.observe(&["/x"], 0.2); // boundary is inclusive
        h.observe(&["/x"], 1.7);
        h.observe(&["/x"], 9.0);

        let s = h.get(&["/x"]).unwrap();
        assert_eq!(s.count, 4);
        let counts: Vec<u64> = s.buckets.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![1, 1, 1, 2, 2, 2, 2, 3, 3]);
        assert!((s.sum - 10.903).abs() < 1e-9);
    }

    #[test]
    fn mean_is_derived() {
        let h = hist();
        assert!(h.get(&["/x"]).is_none());
        h.observe(&["/x"], 1.0);
        h.observe(&["/x"], 3.0);
        assert_eq!(h.get(&["/x"]).unwrap().mean(), Some(2.0));
    }

    #[test]
    fn rejects_bad_buckets() {
        assert!(HistogramVec::new("h", "h", &[], &[]).is_err());
        assert!(HistogramVec::new("h", "h", &[], &[1.0, 1.0]).is_err());
        assert!(HistogramVec::new("h", "h", &[], &[0.5, f64::INFINITY]).is_err());
    }

    #[test]
    fn collect_emits_bucket_sum_count() {
        let h = hist();
        h.observe(&["/x"], 0.07);
        let fam = h.collect().remove(0);
        // 9 bounds + Inf + sum + count
        assert_eq!(fam.samples.len(), 12);
        let inf = &fam.samples[9];
        assert_eq!(inf.labels.last().unwrap(), &("le".to_string(), "+Inf".to_string()));
        assert_eq!(fam.samples[1].labels.last().unwrap().1, "0.05");
        assert_eq!(fam.samples[5].labels.last().unwrap().1, "1");
    }
}
