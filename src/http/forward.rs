//! Forwarding of one inbound request to the upstream.
//!
//! # Responsibilities
//! - Own the outbound client (HTTP/1.1 + HTTP/2, TLS via rustls)
//! - Translate inbound request → outbound request (method, headers, body)
//! - Relay the upstream response (status, reason phrase, headers, body)
//!
//! # Design Decisions
//! - Bodies are streamed in both directions, never buffered
//! - A single attempt per request; the client never retries on its own
//! - Request timeout covers the exchange up to the response head
//! - Dropping the returned future (caller went away) abandons the upstream
//!   exchange

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::TimeoutConfig;
use crate::http::error::{ForwardError, ServerError};
use crate::http::headers;
use crate::upstream::UpstreamOrigin;

type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Forwards requests to a fixed upstream origin.
#[derive(Clone)]
pub struct Forwarder {
    origin: UpstreamOrigin,
    client: UpstreamClient,
    request_timeout: Option<Duration>,
}

impl Forwarder {
    /// Build a forwarder and its outbound client.
    pub fn new(origin: UpstreamOrigin, timeouts: &TimeoutConfig) -> Result<Self, ServerError> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(timeouts.connect());

        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new())
            .retry_canceled_requests(false)
            .build(https);

        Ok(Self {
            origin,
            client,
            request_timeout: timeouts.request(),
        })
    }

    pub fn origin(&self) -> &UpstreamOrigin {
        &self.origin
    }

    /// Outbound URI for an inbound request URI.
    pub fn target(&self, inbound: &Uri) -> Result<Uri, ForwardError> {
        Ok(self.origin.target_uri(inbound)?)
    }

    /// Send `request` to `target` and return the upstream response.
    ///
    /// Any upstream status is a success here; only failing to obtain a
    /// response is an error.
    pub async fn forward(
        &self,
        target: Uri,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();

        let mut outbound = Request::builder()
            .method(parts.method)
            .uri(target)
            .body(body)?;
        *outbound.headers_mut() =
            headers::outbound_request_headers(&parts.headers, self.origin.authority());

        let pending = self.client.request(outbound);
        let response = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| ForwardError::Timeout(limit))??,
            None => pending.await?,
        };

        // Extensions carry hyper's ReasonPhrase, so a custom status text
        // survives the trip back to the caller.
        let (mut parts, body) = response.into_parts();
        headers::strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
