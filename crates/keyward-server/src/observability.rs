//! Tracing setup for the `keyward` binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Installs the global subscriber with the configured level.
///
/// A parsable `RUST_LOG` wins over `logging.level`. Later calls are no-ops.
pub fn init_tracing(logging: &LoggingConfig) {
    let rust_log = std::env::var("RUST_LOG").ok();

    let _ = tracing_subscriber::registry()
        .with(env_filter(logging, rust_log.as_deref()))
        .with(fmt::layer())
        .try_init();
}

fn env_filter(logging: &LoggingConfig, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(&logging.level))
}
