//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all forwarding handler
//! - Wire up middleware (tracing, body limit, concurrency limit)
//! - Bind server to listener
//! - Forward every request to the upstream and relay the answer

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::http::error::ServerError;
use crate::http::forward::Forwarder;
use crate::lifecycle::ShutdownSignal;
use crate::upstream::UpstreamOrigin;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let origin = UpstreamOrigin::parse(&config.upstream.origin)?;
        let forwarder = Arc::new(Forwarder::new(origin, &config.timeouts)?);

        let router = Self::build_router(&config, AppState { forwarder });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        // Fallback rather than routes: `*` and authority-form targets have no
        // path for a route to match.
        let mut router = Router::new().fallback(proxy_handler).with_state(state);

        if let Some(limit) = config.limits.max_body_bytes {
            router = router.layer(RequestBodyLimitLayer::new(limit));
        }
        if let Some(max) = config.limits.max_concurrent_requests {
            router = router.layer(GlobalConcurrencyLimitLayer::new(max));
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    ///
    /// In-flight requests are allowed to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Forward the request to the upstream origin and relay its response.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let target = match state.forwarder.target(request.uri()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                uri = %request.uri(),
                error = %e,
                "Invalid upstream target"
            );
            return e.into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        peer = %peer,
        method = %method,
        target = %target,
        "Proxying request"
    );

    match state.forwarder.forward(target.clone(), request).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                status = %response.status(),
                "Upstream responded"
            );
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                target = %target,
                error = %e,
                "Proxy request failed"
            );
            e.into_response()
        }
    }
}
