//! Domain types shared by the dispatch manager, metric tracker and error
//! logger.

pub mod app_error;
pub mod event;
pub mod labels;
pub mod metric;

pub use app_error::{AppError, ErrorSource};
pub use event::TrackingEvent;
pub use labels::{ErrorGroup, EventCategory, EventPriority, ProviderStatus, Severity, Visibility};
pub use metric::{MetricHandle, MetricState, MetricType, PerformanceMetric};

/// Free-form JSON properties attached to events, traits and error context.
pub type Properties = serde_json::Map<String, serde_json::Value>;
