//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream every request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Outbound timeouts.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Default configuration pointed at `origin`.
    pub fn with_upstream(origin: impl Into<String>) -> Self {
        Self {
            upstream: UpstreamConfig {
                origin: origin.into(),
            },
            ..Self::default()
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and authority, e.g. "https://generativelanguage.googleapis.com".
    /// Required: an empty origin fails validation.
    pub origin: String,
}

/// Timeout configuration for the outbound exchange.
///
/// Unset values impose no limit of our own.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP connect timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Time allowed until the upstream response head arrives, in seconds.
    pub request_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Option<Duration> {
        self.connect_secs.map(Duration::from_secs)
    }

    pub fn request(&self) -> Option<Duration> {
        self.request_secs.map(Duration::from_secs)
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: Option<usize>,

    /// Maximum number of requests in flight across all connections.
    pub max_concurrent_requests: Option<usize>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
        }
    }
}
