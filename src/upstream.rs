//! The fixed upstream origin and target URL derivation.
//!
//! # Data Flow
//! ```text
//! config.upstream.origin ("https://api.example")
//!     → UpstreamOrigin::parse (validated once at startup)
//!     → shared read-only by every request
//!
//! Inbound "/v1/models?key=ABC"
//!     → target_uri() → "https://api.example/v1/models?key=ABC"
//! ```
//!
//! # Design Decisions
//! - Only scheme and authority are kept; the inbound authority (absolute-form
//!   request targets, Host header) never reaches the target URL
//! - Path and query are copied as received: no normalization, no re-encoding
//! - An empty query (`/a?`) is dropped along with its `?`

use std::fmt;
use std::str::FromStr;

use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;
use thiserror::Error;
use url::Url;

/// Reasons an upstream origin string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginError {
    #[error("not an absolute URL: {0}")]
    Parse(String),

    #[error("unsupported scheme `{0}` (expected http or https)")]
    Scheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("credentials are not allowed in the origin")]
    Credentials,

    #[error("origin must not carry a path, query or fragment (got `{0}`)")]
    NotAnOrigin(String),

    #[error("invalid authority `{0}`")]
    Authority(String),
}

/// Scheme plus authority of the single upstream all traffic goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamOrigin {
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamOrigin {
    /// Parse and validate an origin such as `https://upstream.example:8443`.
    ///
    /// A single trailing `/` is accepted so that `<origin><path>` never
    /// produces a doubled slash.
    pub fn parse(input: &str) -> Result<Self, OriginError> {
        let url = Url::parse(input.trim()).map_err(|e| OriginError::Parse(e.to_string()))?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(OriginError::Scheme(other.to_string())),
        };

        if !url.username().is_empty() || url.password().is_some() {
            return Err(OriginError::Credentials);
        }

        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            let mut extra = url.path().to_string();
            if let Some(query) = url.query() {
                extra.push('?');
                extra.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                extra.push('#');
                extra.push_str(fragment);
            }
            return Err(OriginError::NotAnOrigin(extra));
        }

        let host = url.host_str().ok_or(OriginError::MissingHost)?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority =
            Authority::from_str(&authority).map_err(|_| OriginError::Authority(authority))?;

        Ok(Self { scheme, authority })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Build the outbound URI for an inbound request URI.
    ///
    /// Only the inbound path and query participate. An inbound URI without a
    /// path (authority-form) maps to `/`.
    pub fn target_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query(inbound))
            .build()
    }
}

impl fmt::Display for UpstreamOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

impl FromStr for UpstreamOrigin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn path_and_query(inbound: &Uri) -> String {
    let path = match inbound.path() {
        "" => "/",
        p => p,
    };
    match inbound.query() {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}
