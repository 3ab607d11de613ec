//! Tunables for the metric tracker.

use std::collections::HashMap;
use std::time::Duration;

use vitaltrace_domain::constants::{DEFAULT_MAX_METRICS_PER_TYPE, DEFAULT_MAX_METRIC_AGE_SECS};
use vitaltrace_domain::{MetricType, PerformanceConfig, Result};

/// Thresholds, throttle windows and buffer limits.
///
/// Types missing from the maps have no threshold and are unthrottled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub thresholds: HashMap<MetricType, Duration>,
    pub throttle: HashMap<MetricType, Duration>,
    pub max_metrics_per_type: usize,
    pub max_age: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            thresholds: MetricType::ALL
                .iter()
                .filter_map(|ty| ty.default_threshold().map(|threshold| (*ty, threshold)))
                .collect(),
            throttle: MetricType::ALL.iter().map(|ty| (*ty, ty.default_throttle())).collect(),
            max_metrics_per_type: DEFAULT_MAX_METRICS_PER_TYPE,
            max_age: Duration::from_secs(DEFAULT_MAX_METRIC_AGE_SECS),
        }
    }
}

impl TrackerSettings {
    /// Built-in defaults with the configured overrides applied.
    ///
    /// # Errors
    /// Returns `TelemetryError::Config` when an override names an unknown
    /// metric type.
    pub fn from_config(config: &PerformanceConfig) -> Result<Self> {
        let mut settings = Self {
            max_metrics_per_type: config.max_metrics_per_type,
            max_age: config.max_metric_age(),
            ..Self::default()
        };
        settings.thresholds.extend(config.threshold_overrides()?);
        settings.throttle.extend(config.throttle_overrides()?);
        Ok(settings)
    }

    pub fn threshold(&self, metric_type: MetricType) -> Option<Duration> {
        self.thresholds.get(&metric_type).copied()
    }

    /// Throttle window for `metric_type`; zero means every report goes out.
    pub fn throttle_window(&self, metric_type: MetricType) -> Duration {
        self.throttle.get(&metric_type).copied().unwrap_or_default()
    }

    /// Per-type buffer cap, never below one.
    pub fn buffer_cap(&self) -> usize {
        self.max_metrics_per_type.max(1)
    }
}
