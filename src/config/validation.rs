//! Configuration validation.
//!
//! # Responsibilities
//! - Require an upstream origin and check it is a bare http(s) origin
//! - Validate the bind address and value ranges (timeouts and limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::upstream::{OriginError, UpstreamOrigin};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.origin is required")]
    MissingUpstream,

    #[error("upstream.origin is invalid: {0}")]
    InvalidUpstream(#[from] OriginError),

    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.origin.trim().is_empty() {
        errors.push(ValidationError::MissingUpstream);
    } else if let Err(e) = UpstreamOrigin::parse(&config.upstream.origin) {
        errors.push(e.into());
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.connect_secs == Some(0) {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_bytes == Some(0) {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }
    if config.limits.max_concurrent_requests == Some(0) {
        errors.push(ValidationError::Zero("limits.max_concurrent_requests"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
