//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all handler)
//!     → forward.rs (target URI, outbound request, single attempt)
//!     → headers.rs (hop-by-hop stripping, Host rewrite)
//!     → upstream response relayed as-is
//!         or error.rs (transport failure → 500)
//! ```

pub mod error;
pub mod forward;
pub mod headers;
pub mod server;

pub use error::{ForwardError, ServerError};
pub use forward::Forwarder;
pub use server::HttpServer;
