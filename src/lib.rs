//! Single-upstream HTTP reverse proxy.
//!
//! Every inbound request is forwarded to one fixed upstream origin with its
//! method, path, query, headers and body intact, and the upstream response is
//! relayed back unchanged. Transport failures become a plain-text 500.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, ShutdownSignal};
pub use upstream::UpstreamOrigin;
