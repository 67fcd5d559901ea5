//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! signals.rs: SIGINT/SIGTERM → Shutdown::trigger()
//! shutdown.rs: watch channel → HttpServer stops accepting → in-flight requests drain
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
