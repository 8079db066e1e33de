//! Client-side quantile summary.
//!
//! Quantiles are nearest-rank over a sliding window of the most recent
//! observations of each series; `_sum` and `_count` cover every observation
//! since start.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    atomic_f64_add, atomic_f64_load, Collector, MetricDesc, MetricFamily, MetricKind, Sample,
    SampleValue, SeriesMap,
};
use crate::error::{HiloadError, Result};

pub const DEFAULT_MAX_SAMPLES: usize = 1024;

struct SummarySeries {
    count: AtomicU64,
    sum: AtomicU64,
    window: Mutex<VecDeque<f64>>,
}

/// Point-in-time read of one summary series.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub count: u64,
    pub sum: f64,
    /// `(quantile, value)`; value is NaN while the window is empty.
    pub quantiles: Vec<(f64, f64)>,
}

pub struct SummaryVec {
    quantiles: Arc<[f64]>,
    max_samples: usize,
    series: SeriesMap<SummarySeries>,
}

impl SummaryVec {
    /// `quantiles` must lie in (0, 1); `max_samples` bounds each series window.
    pub fn new(
        name: &str,
        help: &str,
        labels: &[&str],
        quantiles: &[f64],
        max_samples: usize,
    ) -> Result<Self> {
        let desc = MetricDesc::new(MetricKind::Summary, name, help, labels)?;
        if let Some(q) = quantiles.iter().find(|q| !(**q > 0.0 && **q < 1.0)) {
            return Err(HiloadError::InvalidMetric(format!(
                "{name}: quantile {q} outside (0, 1)"
            )));
        }
        if max_samples == 0 {
            return Err(HiloadError::InvalidMetric(format!("{name}: max_samples must be > 0")));
        }
        Ok(Self {
            quantiles: quantiles.into(),
            max_samples,
            series: SeriesMap::new(desc),
        })
    }

    pub fn quantiles(&self) -> &[f64] {
        &self.quantiles
    }

    pub fn observe(&self, labels: &[&str], v: f64) {
        let cap = self.max_samples;
        self.series.with_series(
            labels,
            || SummarySeries {
                count: AtomicU64::new(0),
                sum: AtomicU64::new(0f64.to_bits()),
                window: Mutex::new(VecDeque::with_capacity(cap.min(64))),
            },
            |s| {
                {
                    let mut w = s.window.lock().unwrap_or_else(|e| e.into_inner());
                    if w.len() >= cap {
                        w.pop_front();
                    }
                    w.push_back(v);
                }
                atomic_f64_add(&s.sum, v);
                s.count.fetch_add(1, Ordering::Relaxed);
            },
        );
    }

    pub fn get(&self, labels: &[&str]) -> Option<SummarySnapshot> {
        self.series.read(labels, |s| self.snapshot(s))
    }

    fn snapshot(&self, s: &SummarySeries) -> SummarySnapshot {
        let mut sorted: Vec<f64> = {
            let w = s.window.lock().unwrap_or_else(|e| e.into_inner());
            w.iter().copied().collect()
        };
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        let quantiles = self
            .quantiles
            .iter()
            .map(|&q| (q, nearest_rank(&sorted, q)))
            .collect();
        SummarySnapshot {
            count: s.count.load(Ordering::Relaxed),
            sum: atomic_f64_load(&s.sum),
            quantiles,
        }
    }
}

/// Nearest-rank quantile of an ascending slice.
fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (sorted.len() as f64 * q).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

impl Collector for SummaryVec {
    fn descs(&self) -> Vec<MetricDesc> {
        vec![self.series.desc().clone()]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut samples = Vec::new();
        self.series.for_each_sorted(|labels, s| {
            let snap = self.snapshot(s);
            for (q, v) in &snap.quantiles {
                let mut l = labels.clone();
                l.push(("quantile".to_string(), super::encode::format_float(*q)));
                samples.push(Sample { suffix: "", labels: l, value: SampleValue::Float(*v) });
            }
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

    const QUANTILES: [f64; 3] = [0.5, 0.95, 0.99];

    #[test]
    fn quantiles_over_window() {
        let s = SummaryVec::new("lat", "latency", &["route"], &QUANTILES, 1000).unwrap();
        for i in 1..=100 {
            s.observe(&["/x"], i as f64);
        }
        let snap = s.get(&["/x"]).unwrap();
        assert_eq!(snap.count, 100);
        assert_eq!(snap.sum, 5050.0);
        assert_eq!(snap.quantiles, vec![(0.5, 50.0), (0.95, 95.0), (0.99, 99.0)]);
    }

    #[test]
    fn window_slides_but_totals_do_not() {
        let s = SummaryVec::new("lat", "latency", &[], &[0.5], 3).unwrap();
        for v in [100.0, 100.0, 100.0, 1.0, 1.0, 1.0] {
            s.observe(&[], v);
        }
        let snap = s.get(&[]).unwrap();
        assert_eq!(snap.count, 6);
        assert_eq!(snap.sum, 303.0);
        assert_eq!(snap.quantiles[0].1, 1.0);
    }

    #[test]
    fn rejects_bad_quantiles() {
        assert!(SummaryVec::new("s", "s", &[], &[0.0], 10).is_err());
        assert!(SummaryVec::new("s", "s", &[], &[1.0], 10).is_err());
        assert!(SummaryVec::new("s", "s", &[], &[0.5], 0).is_err());
    }

    #[test]
    fn empty_window_is_nan() {
        assert!(nearest_rank(&[], 0.5).is_nan());
        assert_eq!(nearest_rank(&[7.0], 0.99), 7.0);
    }
}
