//! Service config loader (strict parsing).
//!
//! Resolution order for the binary: `HILOAD_CONFIG` path, then `hiload.yaml`
//! in the working directory, then built-in defaults. `PORT` overrides
//! `service.port` in every case.

pub mod schema;

use std::fs;
use std::path::Path;

use hiload_core::error::{HiloadError, Result};

pub use schema::{MetricsSection, ServiceConfig, ServiceSection, SyntheticSection};

pub const CONFIG_ENV: &str = "HILOAD_CONFIG";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_CONFIG_FILE: &str = "hiload.yaml";

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HiloadError::InvalidConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| HiloadError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply a `PORT` value (if any) on top of a loaded config.
pub fn apply_port_override(cfg: &mut ServiceConfig, port: Option<&str>) -> Result<()> {
    if let Some(p) = port {
        cfg.service.port = p
            .trim()
            .parse()
            .map_err(|_| HiloadError::InvalidConfig(format!("{PORT_ENV} must be a port number, got {p:?}")))?;
    }
    Ok(())
}

/// Resolve config the way the binary does, from the process environment.
pub fn load_from_env() -> Result<ServiceConfig> {
    let mut cfg = match std::env::var(CONFIG_ENV) {
        Ok(path) => load_from_file(&path)?,
        Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => load_from_file(DEFAULT_CONFIG_FILE)?,
        Err(_) => ServiceConfig::default(),
    };
    let port = std::env::var(PORT_ENV).ok();
    apply_port_override(&mut cfg, port.as_deref())?;
    Ok(cfg)
}
