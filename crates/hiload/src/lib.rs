//! Top-level facade crate for hiload.
//!
//! Re-exports the metrics core and the service library so users can depend on a single crate.

pub mod core {
    pub use hiload_core::*;
}

pub mod service {
    pub use hiload_service::*;
}
