//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)          CLI flags (--upstream, --bind)
//!     → loader.rs (parse)          │
//!     → overrides applied ◀────────┘
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults except the upstream origin, which validation
//!   requires to be set
//! - Limits and timeouts are optional; unset means the transport default
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
