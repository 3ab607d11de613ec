//! Performance measurements tracked between `start` and `end`.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Properties;
use crate::impl_domain_status_conversions;

/// Kind of operation being measured.
///
/// Thresholds, throttle windows and the per-type buffer cap are all keyed by
/// this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    ComponentRender,
    ApiRequest,
    ResourceLoad,
    UserInteraction,
    RouteChange,
    AppLoad,
    AppReady,
}

impl_domain_status_conversions!(MetricType {
    ComponentRender => "component_render",
    ApiRequest => "api_request",
    ResourceLoad => "resource_load",
    UserInteraction => "user_interaction",
    RouteChange => "route_change",
    AppLoad => "app_load",
    AppReady => "app_ready",
});

impl MetricType {
    pub const ALL: [Self; 7] = [
        Self::ComponentRender,
        Self::ApiRequest,
        Self::ResourceLoad,
        Self::UserInteraction,
        Self::RouteChange,
        Self::AppLoad,
        Self::AppReady,
    ];

    /// Default slow-operation threshold, if the type has one.
    pub fn default_threshold(self) -> Option<Duration> {
        match self {
            Self::ComponentRender | Self::UserInteraction => Some(Duration::from_millis(100)),
            Self::ApiRequest => Some(Duration::from_millis(2_000)),
            Self::ResourceLoad => Some(Duration::from_millis(3_000)),
            Self::RouteChange => Some(Duration::from_millis(300)),
            Self::AppLoad | Self::AppReady => None,
        }
    }

    /// Default minimum interval between two reports of the same
    /// `(type, name)` pair. Zero means unthrottled.
    pub fn default_throttle(self) -> Duration {
        match self {
            Self::ComponentRender => Duration::from_secs(2),
            Self::ApiRequest => Duration::from_secs(5),
            Self::ResourceLoad => Duration::from_secs(10),
            Self::UserInteraction => Duration::from_secs(1),
            Self::RouteChange | Self::AppLoad | Self::AppReady => Duration::ZERO,
        }
    }
}

/// Opaque identifier returned by `start` and consumed by `end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricHandle(String);

impl MetricHandle {
    /// Build a handle from its parts.
    ///
    /// `created_nanos` is a high-resolution creation stamp and `sequence` a
    /// process-unique counter, so two starts in the same instant still get
    /// distinct handles.
    pub fn new(metric_type: MetricType, name: &str, created_nanos: u128, sequence: u64) -> Self {
        Self(format!("{metric_type}:{name}:{created_nanos}:{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a buffered metric is in its lifecycle.
///
/// Reported and evicted metrics leave the buffer, so only these two states
/// are ever observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricState {
    Open,
    Closed,
}

impl_domain_status_conversions!(MetricState {
    Open => "open",
    Closed => "closed",
});

/// A single measurement held in the tracker's buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetric {
    pub handle: MetricHandle,
    pub name: String,
    pub metric_type: MetricType,
    /// Monotonic start instant.
    pub start: Instant,
    pub end: Option<Instant>,
    pub duration: Option<Duration>,
    pub metadata: Option<Properties>,
    /// Wall-clock creation time, used for TTL cleanup.
    pub created_at: DateTime<Utc>,
    /// Creation order among all metrics; oldest has the smallest value.
    pub sequence: u64,
}

impl PerformanceMetric {
    pub fn state(&self) -> MetricState {
        if self.duration.is_some() {
            MetricState::Closed
        } else {
            MetricState::Open
        }
    }

    /// Duration in fractional milliseconds, as forwarded to sinks.
    pub fn duration_ms(&self) -> Option<f64> {
        self.duration.map(|d| d.as_nanos() as f64 / 1_000_000.0)
    }
}
