//! Error types for the HTTP layer.
//!
//! # Design Decisions
//! - Only failures to complete the upstream exchange are errors; upstream
//!   4xx/5xx responses are relayed as ordinary responses
//! - Every transport failure renders as 500 with a short plain-text body
//! - Nothing is retried

use std::error::Error as StdError;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper_util::client::legacy;
use thiserror::Error;

use crate::upstream::OriginError;

/// Failure to complete the exchange with the upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The outbound request could not be constructed.
    #[error("invalid upstream request: {0}")]
    Request(#[from] axum::http::Error),

    /// DNS, TCP connect or TLS handshake failed.
    #[error("could not connect to upstream: {}", describe(.0))]
    Connect(legacy::Error),

    /// No response head within the configured request timeout.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The connection failed after it was established.
    #[error("upstream exchange failed: {}", describe(.0))]
    Upstream(legacy::Error),
}

impl From<legacy::Error> for ForwardError {
    fn from(error: legacy::Error) -> Self {
        if error.is_connect() {
            ForwardError::Connect(error)
        } else {
            ForwardError::Upstream(error)
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("proxy request failed: {self}"),
        )
            .into_response()
    }
}

/// Errors raised while building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream origin: {0}")]
    Origin(#[from] OriginError),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),
}

/// Flatten an error and its sources into one line.
fn describe(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
