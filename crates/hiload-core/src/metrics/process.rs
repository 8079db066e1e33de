//! Process-level default metrics (uptime, memory, file descriptors).
//!
//! Memory and fd counts come from `/proc/self` and are only available on
//! Linux; elsewhere those series are omitted rather than reported as zero.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::{Collector, MetricDesc, MetricFamily, MetricKind, Sample, SampleValue};

const START_TIME: &str = "process_start_time_seconds";
const UPTIME: &str = "process_uptime_seconds";
const RESIDENT: &str = "process_resident_memory_bytes";
const VIRTUAL: &str = "process_virtual_memory_bytes";
const OPEN_FDS: &str = "process_open_fds";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub rss: Option<u64>,
    #[serde(rename = "virtual")]
    pub virtual_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessStats {
    pub start_time_seconds: f64,
    pub uptime_seconds: f64,
    pub memory: MemoryUsage,
    pub open_fds: Option<u64>,
}

pub struct ProcessCollector {
    started: Instant,
    start_time_seconds: f64,
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    pub fn new() -> Self {
        let start_time_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self {
            started: Instant::now(),
            start_time_seconds,
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn stats(&self) -> ProcessStats {
        ProcessStats {
            start_time_seconds: self.start_time_seconds,
            uptime_seconds: self.uptime_seconds(),
            memory: read_memory(),
            open_fds: count_open_fds(),
        }
    }
}

#[cfg(target_os = "linux")]
fn read_memory() -> MemoryUsage {
    match std::fs::read_to_string("/proc/self/status") {
        Ok(status) => parse_status_memory(&status),
        Err(_) => MemoryUsage { rss: None, virtual_size: None },
    }
}

/// `VmRSS` and `VmSize` from `/proc/<pid>/status`, which are in kB regardless
/// of the kernel page size.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_status_memory(status: &str) -> MemoryUsage {
    let field = |key: &str| {
        status.lines().find_map(|line| {
            let rest = line.strip_prefix(key)?.strip_prefix(':')?;
            let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
            Some(kb * 1024)
        })
    };
    MemoryUsage {
        rss: field("VmRSS"),
        virtual_size: field("VmSize"),
    }
}

#[cfg(not(target_os = "linux"))]
fn read_memory() -> MemoryUsage {
    MemoryUsage { rss: None, virtual_size: None }
}

#[cfg(target_os = "linux")]
fn count_open_fds() -> Option<u64> {
    // the listing itself holds one descriptor open
    std::fs::read_dir("/proc/self/fd")
        .ok()
        .map(|dir| (dir.filter_map(|e| e.ok()).count() as u64).saturating_sub(1))
}

#[cfg(not(target_os = "linux"))]
fn count_open_fds() -> Option<u64> {
    None
}

const FAMILIES: [(&str, &str); 5] = [
    (START_TIME, "Start time of the process since unix epoch in seconds."),
    (UPTIME, "Seconds since the process started."),
    (RESIDENT, "Resident memory size in bytes."),
    (VIRTUAL, "Virtual memory size in bytes."),
    (OPEN_FDS, "Number of open file descriptors."),
];

fn gauge_desc(name: &str, help: &str) -> Option<MetricDesc> {
    MetricDesc::new(MetricKind::Gauge, name, help, &[]).ok()
}

impl Collector for ProcessCollector {
    fn descs(&self) -> Vec<MetricDesc> {
        FAMILIES
            .iter()
            .filter_map(|(name, help)| gauge_desc(name, help))
            .collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let stats = self.stats();
        let values = [
            Some(SampleValue::Float(stats.start_time_seconds)),
            Some(SampleValue::Float(stats.uptime_seconds)),
            stats.memory.rss.map(SampleValue::Unsigned),
            stats.memory.virtual_size.map(SampleValue::Unsigned),
            stats.open_fds.map(SampleValue::Unsigned),
        ];
        FAMILIES
            .iter()
            .zip(values)
            .filter_map(|((name, help), value)| {
                let desc = gauge_desc(name, help)?;
                Some(MetricFamily {
                    desc,
                    samples: vec![Sample { suffix: "", labels: Vec::new(), value: value? }],
                })
            })
            .collect()
    }
}
