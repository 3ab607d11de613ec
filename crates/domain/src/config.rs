//! Configuration structures
//!
//! Every section has a `Default` matching the pipeline's built-in behavior,
//! so partial JSON/TOML files and empty environments are valid.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_ERROR_BUFFER_CAPACITY, DEFAULT_MAX_METRICS_PER_TYPE,
    DEFAULT_MAX_METRIC_AGE_SECS,
};
use crate::impl_domain_status_conversions;
use crate::{MetricType, Result, Severity, TelemetryError};

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub mode: RuntimeMode,
    pub analytics: AnalyticsConfig,
    pub performance: PerformanceConfig,
    pub errors: ErrorLoggerConfig,
    pub logging: LoggingConfig,
}

/// Runtime mode of the hosting application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    Development,
    #[default]
    Production,
    Test,
}

impl_domain_status_conversions!(RuntimeMode {
    Development => "development",
    Production => "production",
    Test => "test",
});

/// Dispatch manager configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Force the console provider on or off. `None` registers it only in
    /// [`RuntimeMode::Development`].
    pub console_provider: Option<bool>,
}

impl AnalyticsConfig {
    pub fn console_provider_enabled(&self, mode: RuntimeMode) -> bool {
        self.console_provider.unwrap_or(mode == RuntimeMode::Development)
    }
}

/// Metric tracker configuration
///
/// Threshold and throttle maps hold per-type overrides in milliseconds,
/// keyed by the metric type label (`component_render`, `api_request`, ...).
/// Types without an override keep their built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub max_metrics_per_type: usize,
    pub cleanup_interval_secs: u64,
    pub max_metric_age_secs: u64,
    pub thresholds_ms: BTreeMap<String, u64>,
    pub throttle_ms: BTreeMap<String, u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_metrics_per_type: DEFAULT_MAX_METRICS_PER_TYPE,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            max_metric_age_secs: DEFAULT_MAX_METRIC_AGE_SECS,
            thresholds_ms: BTreeMap::new(),
            throttle_ms: BTreeMap::new(),
        }
    }
}

impl PerformanceConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn max_metric_age(&self) -> Duration {
        Duration::from_secs(self.max_metric_age_secs)
    }

    /// Parsed threshold overrides.
    ///
    /// # Errors
    /// Returns `TelemetryError::Config` for an unknown metric type label.
    pub fn threshold_overrides(&self) -> Result<Vec<(MetricType, Duration)>> {
        parse_overrides("thresholds_ms", &self.thresholds_ms)
    }

    /// Parsed throttle-window overrides.
    ///
    /// # Errors
    /// Returns `TelemetryError::Config` for an unknown metric type label.
    pub fn throttle_overrides(&self) -> Result<Vec<(MetricType, Duration)>> {
        parse_overrides("throttle_ms", &self.throttle_ms)
    }
}

fn parse_overrides(
    field: &str,
    entries: &BTreeMap<String, u64>,
) -> Result<Vec<(MetricType, Duration)>> {
    entries
        .iter()
        .map(|(key, millis)| {
            key.parse::<MetricType>()
                .map(|metric_type| (metric_type, Duration::from_millis(*millis)))
                .map_err(|e| TelemetryError::Config(format!("{field}: {e}")))
        })
        .collect()
}

/// Error logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorLoggerConfig {
    pub buffer_capacity: usize,
    /// Lowest severity for which a flagged error reaches the user.
    pub notify_min_severity: Severity,
}

impl Default for ErrorLoggerConfig {
    fn default() -> Self {
        Self { buffer_capacity: DEFAULT_ERROR_BUFFER_CAPACITY, notify_min_severity: Severity::Warning }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
