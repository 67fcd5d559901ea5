//! Header passthrough rules.
//!
//! # Responsibilities
//! - Copy inbound request headers onto the outbound request
//! - Strip hop-by-hop headers in both directions
//! - Point `Host` at the upstream authority
//!
//! # Design Decisions
//! - Everything end-to-end passes through untouched, including credentials
//!   and multi-valued headers
//! - Hop-by-hop headers (RFC 9110 §7.6.1) describe one connection only; each
//!   side of the proxy frames its own connection, so they are dropped
//! - Headers listed in `Connection` are hop-by-hop as well

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::uri::Authority;

static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Headers for the outbound request: the inbound set minus hop-by-hop
/// headers, with `Host` set to the upstream authority.
pub fn outbound_request_headers(inbound: &HeaderMap, upstream: &Authority) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);
    if let Ok(host) = HeaderValue::from_str(upstream.as_str()) {
        headers.insert(header::HOST, host);
    }
    headers
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in connection_listed(headers) {
        headers.remove(&name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}
