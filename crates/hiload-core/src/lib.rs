//! hiload core: metric instruments, the registry, and the text encoder.
//!
//! This crate defines the metrics data model and exposition contract shared by
//! the service and its tests. It carries no HTTP or async runtime dependency so
//! the instruments can be exercised directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Label arity mismatches are logged and dropped; encoding problems surface
//! as `HiloadError::Exposition`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{HiloadError, Result};
