//! Single-upstream reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────┐
//!  Client Request │  ┌──────────┐    ┌──────────┐    ┌─────────┐  │
//!  ───────────────┼─▶│  axum    │───▶│ forward  │───▶│ hyper   │──┼──▶ Upstream
//!                 │  │ server   │    │ handler  │    │ client  │  │    Origin
//!  Client Response│  └──────────┘    └──────────┘    └─────────┘  │
//!  ◀──────────────┼──────── status, headers, body passthrough ◀───┼───
//!                 │                                               │
//!                 │   config (TOML + CLI)   logging   shutdown    │
//!                 └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use upstream_proxy::config::{read_config, validate_config, ConfigError};
use upstream_proxy::lifecycle::signals::wait_for_signal;
use upstream_proxy::observability::init_logging;
use upstream_proxy::{HttpServer, ProxyConfig, Shutdown};

#[derive(Parser)]
#[command(name = "upstream-proxy")]
#[command(about = "Forward every request to a single upstream origin", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream origin, e.g. https://generativelanguage.googleapis.com
    #[arg(short, long)]
    upstream: Option<String>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };
        if let Some(origin) = self.upstream {
            config.upstream.origin = origin;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        validate_config(&config)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("upstream-proxy: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.into_config()?;

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin,
        request_timeout_secs = ?config.timeouts.request_secs,
        max_body_bytes = ?config.limits.max_body_bytes,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => signal_shutdown.trigger(),
            Err(e) => tracing::error!(error = %e, "Failed to install signal handlers"),
        }
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
