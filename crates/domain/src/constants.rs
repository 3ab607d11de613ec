//! Pipeline constants
//!
//! Centralized location for event names, error codes and the default limits
//! shared by the dispatch manager, metric tracker and error logger.

// Event names forwarded to sinks
pub const EVENT_PERFORMANCE_METRIC: &str = "performance_metric";
pub const EVENT_ERROR_OCCURRED: &str = "error_occurred";

// Error codes raised by the pipeline itself
pub const CODE_PERFORMANCE_THRESHOLD_EXCEEDED: &str = "PERFORMANCE_THRESHOLD_EXCEEDED";
pub const CODE_UI_RENDER_FAILED: &str = "UI_RENDER_FAILED";

// Error logger
pub const DEFAULT_ERROR_BUFFER_CAPACITY: usize = 50;
pub const DEFAULT_NOTIFICATION_TITLE: &str = "Something went wrong";
pub const DEFAULT_NOTIFICATION_MESSAGE: &str =
    "An unexpected error occurred. Please try again or reload the page.";

// Metric tracker
pub const DEFAULT_MAX_METRICS_PER_TYPE: usize = 100;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_METRIC_AGE_SECS: u64 = 30 * 60;

// Console provider
pub const CONSOLE_PROVIDER_NAME: &str = "console";

// Environment variables
pub const ENV_RUNTIME_MODE: &str = "VITALTRACE_ENV";
