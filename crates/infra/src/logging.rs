//! Structured logging with tracing
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either
//! the human-readable `fmt` layer or the JSON layer. `RUST_LOG` takes
//! precedence over the configured level.

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vitaltrace_domain::{LoggingConfig, Result, TelemetryError};

/// Initialize the global tracing subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, so calling
/// this more than once is harmless.
///
/// # Errors
/// Returns `TelemetryError::Config` when the configured level is not a
/// valid filter directive.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            TelemetryError::Config(format!("Invalid log level '{}': {}", config.level, e))
        })?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init().is_ok()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
    Ok(installed)
}
