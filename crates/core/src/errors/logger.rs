//! Error logger
//!
//! Every record lands in a bounded ring buffer and produces a `tracing`
//! record. ERROR and CRITICAL records are also forwarded to the analytics
//! sinks as `error_occurred` events with a reduced property set, and flagged
//! records at or above the notify floor are shown to the user through the
//! [`Notifier`] port with user-safe text only.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{error, info, warn};
use vitaltrace_domain::constants::{
    CODE_UI_RENDER_FAILED, DEFAULT_NOTIFICATION_MESSAGE, DEFAULT_NOTIFICATION_TITLE,
    EVENT_ERROR_OCCURRED,
};
use vitaltrace_domain::{
    AppError, ErrorGroup, ErrorLoggerConfig, EventCategory, EventPriority, Properties, Severity,
    TrackingEvent,
};

use super::LogDetails;
use crate::analytics::AnalyticsManager;
use crate::clock::{Clock, SystemClock};
use crate::collections::RingBuffer;
use crate::ports::{Notifier, UserNotification};

/// Central sink for caught errors and anomalies.
///
/// Logging never fails and never re-throws.
pub struct ErrorLogger {
    analytics: Arc<AnalyticsManager>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    buffer: Mutex<RingBuffer<AppError>>,
    notify_min_severity: Severity,
    location: Mutex<Option<String>>,
}

impl ErrorLogger {
    /// Create a logger with the default buffer capacity and notify floor
    pub fn new(analytics: Arc<AnalyticsManager>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(analytics, notifier, &ErrorLoggerConfig::default())
    }

    /// Create a logger from configuration.
    ///
    /// The notify floor is never lower than [`Severity::Warning`]; INFO
    /// records are not shown to the user.
    pub fn with_config(
        analytics: Arc<AnalyticsManager>,
        notifier: Arc<dyn Notifier>,
        config: &ErrorLoggerConfig,
    ) -> Self {
        Self {
            analytics,
            notifier,
            clock: Arc::new(SystemClock),
            buffer: Mutex::new(RingBuffer::new(config.buffer_capacity)),
            notify_min_severity: config.notify_min_severity.max(Severity::Warning),
            location: Mutex::new(None),
        }
    }

    /// Use the given clock to timestamp records built by the wrappers
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record an error.
    pub fn log(&self, error: AppError) {
        emit(&error);

        self.buffer.lock().push(error.clone());

        if error.severity.is_error_class() {
            self.forward(&error);
        }

        if error.should_notify_user && error.severity >= self.notify_min_severity {
            self.notifier.notify(&UserNotification {
                title: error.user_title.clone().unwrap_or_else(|| DEFAULT_NOTIFICATION_TITLE.into()),
                message: error
                    .user_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_NOTIFICATION_MESSAGE.into()),
                severity: error.severity,
            });
        }
    }

    pub fn info(&self, message: impl Into<String>, details: LogDetails) {
        self.log_with(message, Severity::Info, details);
    }

    pub fn warning(&self, message: impl Into<String>, details: LogDetails) {
        self.log_with(message, Severity::Warning, details);
    }

    pub fn error(&self, message: impl Into<String>, details: LogDetails) {
        self.log_with(message, Severity::Error, details);
    }

    /// Record a CRITICAL error; notifies the user unless `details` opts out.
    pub fn critical(&self, message: impl Into<String>, details: LogDetails) {
        self.log_with(message, Severity::Critical, details);
    }

    /// Normalize a Rust error value and record it.
    ///
    /// The error's `Display` text becomes the message and its source chain is
    /// kept in the context under `error_chain`.
    pub fn log_error(&self, err: &(dyn StdError + 'static), severity: Severity, group: ErrorGroup) {
        let mut details = LogDetails::new().group(group);
        if let Some(chain) = source_chain(err) {
            details = details.context_entry("error_chain", chain);
        }
        self.log_with(err.to_string(), severity, details);
    }

    /// Record a failure caught by a UI error boundary around `component`.
    pub fn report_boundary_error(&self, component: &str, err: &(dyn StdError + 'static)) {
        let mut details = LogDetails::new()
            .code(CODE_UI_RENDER_FAILED)
            .group(ErrorGroup::Ui)
            .context_entry("component", component);
        if let Some(chain) = source_chain(err) {
            details = details.context_entry("error_chain", chain);
        }
        self.log_with(err.to_string(), Severity::Error, details);
    }

    /// Buffered records, newest first
    pub fn recent_errors(&self) -> Vec<AppError> {
        self.buffer.lock().newest_first().cloned().collect()
    }

    pub fn clear_buffer(&self) {
        self.buffer.lock().clear();
    }

    /// Current location (route or URL) attached to forwarded errors
    pub fn set_location(&self, location: Option<String>) {
        *self.location.lock() = location;
    }

    pub fn notify_min_severity(&self) -> Severity {
        self.notify_min_severity
    }

    fn log_with(&self, message: impl Into<String>, severity: Severity, details: LogDetails) {
        let error = details.into_error(message, severity).with_timestamp(self.clock.utc_now());
        self.log(error);
    }

    fn forward(&self, error: &AppError) {
        let url = self.location.lock().clone();

        let mut properties = Properties::new();
        properties.insert("message".into(), Value::from(error.message.clone()));
        properties.insert("code".into(), Value::from(error.code.clone()));
        properties.insert("severity".into(), Value::from(error.severity.to_string()));
        properties.insert("group".into(), Value::from(error.group.to_string()));
        properties.insert("timestamp".into(), Value::from(error.timestamp.to_rfc3339()));
        properties.insert("url".into(), Value::from(url));

        let priority = if error.severity == Severity::Critical {
            EventPriority::Critical
        } else {
            EventPriority::High
        };

        self.analytics.track_event(
            TrackingEvent::new(EVENT_ERROR_OCCURRED, EventCategory::Error)
                .with_properties(properties)
                .with_priority(priority)
                .with_timestamp(error.timestamp),
        );
    }
}

impl fmt::Debug for ErrorLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogger")
            .field("buffered", &self.buffer.lock().len())
            .field("notify_min_severity", &self.notify_min_severity)
            .finish()
    }
}

fn emit(error: &AppError) {
    let code = error.code.as_deref().unwrap_or("");
    match error.severity {
        Severity::Info => {
            info!(code, group = %error.group, message = %error.message, "app_error_logged");
        }
        Severity::Warning => {
            warn!(code, group = %error.group, message = %error.message, "app_error_logged");
        }
        Severity::Error => {
            error!(code, group = %error.group, message = %error.message, "app_error_logged");
        }
        Severity::Critical => {
            error!(
                code,
                group = %error.group,
                message = %error.message,
                critical = true,
                "app_error_logged"
            );
        }
    }
}

fn source_chain(err: &(dyn StdError + 'static)) -> Option<Value> {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(Value::from(cause.to_string()));
        current = cause.source();
    }
    (!chain.is_empty()).then_some(Value::Array(chain))
}
