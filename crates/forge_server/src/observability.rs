//! Structured logging setup.
//!
//! `RUST_LOG` wins over the configured level. Refund failures arrive on the
//! `forge::alert` target, so a filter such as `info,forge::alert=error` keeps
//! them visible even when everything else is quiet.

use forge_error::ConfigError;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if `level` is not a valid filter directive or a
/// subscriber is already installed.
pub fn init_tracing(level: &str, json: bool) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ConfigError::new(format!("Invalid log filter '{}': {}", level, e)))?;

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install subscriber: {}", e)))
}
