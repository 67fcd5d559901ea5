//! Structured logging.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default filter directives for a log level.
pub fn default_directives(level: &str) -> String {
    format!("upstream_proxy={level},tower_http={level}")
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(&config.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Full => registry.with(fmt::layer()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    }
}
