//! Shared error type across hiload crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// A metric with the same name is already registered.
    DuplicateMetric,
    /// Metric definition rejected (bad name, buckets, quantiles, labels).
    InvalidMetric,
    /// Metrics could not be encoded to the exposition format.
    Exposition,
    /// Configuration rejected.
    InvalidConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::DuplicateMetric => "DUPLICATE_METRIC",
            ClientCode::InvalidMetric => "INVALID_METRIC",
            ClientCode::Exposition => "EXPOSITION",
            ClientCode::InvalidConfig => "INVALID_CONFIG",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HiloadError>;

/// Unified error type used by core and service.
#[derive(Debug, Error)]
pub enum HiloadError {
    #[error("duplicate metric name: {0}")]
    DuplicateMetricName(String),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("exposition failed: {0}")]
    Exposition(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl HiloadError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HiloadError::DuplicateMetricName(_) => ClientCode::DuplicateMetric,
            HiloadError::InvalidMetric(_) => ClientCode::InvalidMetric,
            HiloadError::Exposition(_) => ClientCode::Exposition,
            HiloadError::InvalidConfig(_) => ClientCode::InvalidConfig,
            HiloadError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            HiloadError::Internal(_) => ClientCode::Internal,
        }
    }
}
