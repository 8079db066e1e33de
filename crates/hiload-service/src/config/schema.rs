use serde::Deserialize;
use hiload_core::error::{HiloadError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub synthetic: SyntheticSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            service: ServiceSection::default(),
            metrics: MetricsSection::default(),
            synthetic: SyntheticSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HiloadError::UnsupportedVersion);
        }

        self.service.validate()?;
        self.metrics.validate()?;
        self.synthetic.validate()?;

        Ok(())
    }

    /// `host:port` string handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServiceSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HiloadError::InvalidConfig("service.name must not be empty".into()));
        }
        if self.host.trim().is_empty() {
            return Err(HiloadError::InvalidConfig("service.host must not be empty".into()));
        }
        Ok(())
    }
}

fn default_name() -> String {
    "high-load-system".into()
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3001
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_process_metrics")]
    pub process_metrics: bool,

    #[serde(default = "default_summary_max_samples")]
    pub summary_max_samples: usize,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            process_metrics: default_process_metrics(),
            summary_max_samples: default_summary_max_samples(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1_000_000).contains(&self.summary_max_samples) {
            return Err(HiloadError::InvalidConfig(
                "metrics.summary_max_samples must be between 1 and 1000000".into(),
            ));
        }
        Ok(())
    }
}

fn default_process_metrics() -> bool {
    true
}
fn default_summary_max_samples() -> usize {
    hiload_core::metrics::summary::DEFAULT_MAX_SAMPLES
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyntheticSection {
    #[serde(default = "default_slow_min_ms")]
    pub slow_min_ms: u64,

    #[serde(default = "default_slow_max_ms")]
    pub slow_max_ms: u64,

    #[serde(default = "default_cpu_iterations")]
    pub cpu_iterations: u64,

    #[serde(default = "default_memory_items")]
    pub memory_items: usize,
}

impl Default for SyntheticSection {
    fn default() -> Self {
        Self {
            slow_min_ms: default_slow_min_ms(),
            slow_max_ms: default_slow_max_ms(),
            cpu_iterations: default_cpu_iterations(),
            memory_items: default_memory_items(),
        }
    }
}

impl SyntheticSection {
    pub fn validate(&self) -> Result<()> {
        if self.slow_min_ms >= self.slow_max_ms {
            return Err(HiloadError::InvalidConfig(
                "synthetic.slow_min_ms must be less than slow_max_ms".into(),
            ));
        }
        if self.slow_max_ms > 60_000 {
            return Err(HiloadError::InvalidConfig(
                "synthetic.slow_max_ms must be at most 60000".into(),
            ));
        }
        if self.cpu_iterations == 0 {
            return Err(HiloadError::InvalidConfig(
                "synthetic.cpu_iterations must be at least 1".into(),
            ));
        }
        if !(1..=10_000_000).contains(&self.memory_items) {
            return Err(HiloadError::InvalidConfig(
                "synthetic.memory_items must be between 1 and 10000000".into(),
            ));
        }
        Ok(())
    }
}

fn default_slow_min_ms() -> u64 {
    1000
}
fn default_slow_max_ms() -> u64 {
    4000
}
fn default_cpu_iterations() -> u64 {
    10_000_000
}
fn default_memory_items() -> usize {
    100_000
}
