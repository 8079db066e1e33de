//! In-process metrics with dynamic labels.
//!
//! Instruments (`CounterVec`, `GaugeVec`, `HistogramVec`, `SummaryVec`) keep one
//! series per label-value tuple in a `DashMap`, created on first observation.
//! Label values are positional and follow the label schema declared at
//! construction. Every instrument implements [`Collector`], which is what the
//! [`Registry`] stores and what the text encoder consumes.

pub mod counter;
pub mod encode;
pub mod gauge;
pub mod histogram;
pub mod process;
pub mod registry;
pub mod summary;

use dashmap::DashMap;

use crate::error::{HiloadError, Result};

pub use counter::CounterVec;
pub use encode::{encode_text, TEXT_CONTENT_TYPE};
pub use gauge::GaugeVec;
pub use histogram::{HistogramSnapshot, HistogramVec};
pub use process::{MemoryUsage, ProcessCollector, ProcessStats};
pub use registry::Registry;
pub use summary::{SummarySnapshot, SummaryVec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

/// Metric definition. Immutable once an instrument is built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    /// Ordered label schema.
    pub labels: Vec<String>,
}

impl MetricDesc {
    pub fn new(kind: MetricKind, name: &str, help: &str, labels: &[&str]) -> Result<Self> {
        if !is_valid_metric_name(name) {
            return Err(HiloadError::InvalidMetric(format!("bad metric name: {name:?}")));
        }
        for (i, l) in labels.iter().enumerate() {
            if !is_valid_label_name(l) {
                return Err(HiloadError::InvalidMetric(format!(
                    "{name}: bad label name: {l:?}"
                )));
            }
            if labels[..i].contains(l) {
                return Err(HiloadError::InvalidMetric(format!(
                    "{name}: duplicate label name: {l}"
                )));
            }
        }
        let reserved = match kind {
            MetricKind::Histogram => Some("le"),
            MetricKind::Summary => Some("quantile"),
            _ => None,
        };
        if let Some(r) = reserved {
            if labels.contains(&r) {
                return Err(HiloadError::InvalidMetric(format!(
                    "{name}: label {r:?} is reserved for {}",
                    kind.as_str()
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

/// One exposition line: `name{suffix}{labels} value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// `""`, `"_bucket"`, `"_sum"` or `"_count"`.
    pub suffix: &'static str,
    /// Schema labels in order, followed by `le`/`quantile` where applicable.
    pub labels: Vec<(String, String)>,
    pub value: SampleValue,
}

/// All current samples for one metric definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub desc: MetricDesc,
    pub samples: Vec<Sample>,
}

/// Anything that can report metric families to a [`Registry`].
pub trait Collector: Send + Sync {
    /// Definitions this collector reports. Used for duplicate-name checks.
    fn descs(&self) -> Vec<MetricDesc>;

    /// Current values. Called on every scrape.
    fn collect(&self) -> Vec<MetricFamily>;
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, not starting with `__`.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Series storage shared by all instruments, keyed by label values in schema order.
pub(crate) struct SeriesMap<T> {
    desc: MetricDesc,
    map: DashMap<Vec<String>, T>,
}

impl<T: Send + Sync> SeriesMap<T> {
    pub(crate) fn new(desc: MetricDesc) -> Self {
        Self { desc, map: DashMap::new() }
    }

    pub(crate) fn desc(&self) -> &MetricDesc {
        &self.desc
    }

    /// Run `f` against the series for `values`, creating it with `init` if needed.
    /// Wrong arity drops the observation.
    pub(crate) fn with_series<I, F>(&self, values: &[&str], init: I, f: F)
    where
        I: FnOnce() -> T,
        F: FnOnce(&T),
    {
        if values.len() != self.desc.labels.len() {
            tracing::warn!(
                metric = %self.desc.name,
                expected = self.desc.labels.len(),
                got = values.len(),
                "label arity mismatch; observation dropped"
            );
            return;
        }
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        if let Some(series) = self.map.get(&key) {
            f(series.value());
            return;
        }
        let series = self.map.entry(key).or_insert_with(init);
        f(series.value());
    }

    /// Read the series for `values` without creating it.
    pub(crate) fn read<R>(&self, values: &[&str], f: impl FnOnce(&T) -> R) -> Option<R> {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map.get(&key).map(|r| f(r.value()))
    }

    /// Visit every series in label order (deterministic output).
    pub(crate) fn for_each_sorted(&self, mut f: impl FnMut(Vec<(String, String)>, &T)) {
        let mut keys: Vec<Vec<String>> = self.map.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        for key in keys {
            if let Some(series) = self.map.get(&key) {
                let labels = self
                    .desc
                    .labels
                    .iter()
                    .cloned()
                    .zip(key.iter().cloned())
                    .collect();
                f(labels, series.value());
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

/// Atomic `f64` accumulator stored as bits.
pub(crate) fn atomic_f64_add(cell: &std::sync::atomic::AtomicU64, v: f64) {
    use std::sync::atomic::Ordering;
    let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
        Some((f64::from_bits(bits) + v).to_bits())
    });
}

pub(crate) fn atomic_f64_load(cell: &std::sync::atomic::AtomicU64) -> f64 {
    f64::from_bits(cell.load(std::sync::atomic::Ordering::Relaxed))
}
