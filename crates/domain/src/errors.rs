//! Error types used throughout the pipeline

use thiserror::Error;

/// Main error type for VitalTrace
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider '{name}' error: {source}")]
    Provider {
        name: String,
        #[source]
        source: ProviderError,
    },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TelemetryError {
    /// Attach a provider name to a sink failure.
    pub fn provider(name: impl Into<String>, source: ProviderError) -> Self {
        Self::Provider { name: name.into(), source }
    }
}

/// Result type alias for VitalTrace operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Failure reported by an analytics provider (sink).
///
/// Sinks return these instead of panicking; the dispatch manager logs them
/// and keeps delivering to the remaining sinks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("provider unavailable")]
    Unavailable,
}

/// Result type alias for sink operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
