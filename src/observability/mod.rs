//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging through `tracing`; the forwarding handler emits one
//!   line before forwarding and one with the outcome
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;
