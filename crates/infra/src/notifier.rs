//! Notifier that routes user notifications to the log.
//!
//! Hosts without a toast surface (headless services, tests, CLIs) register
//! this so notifications are still visible somewhere.

use tracing::{error, warn};
use vitaltrace_core::{Notifier, UserNotification};
use vitaltrace_domain::Severity;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &UserNotification) {
        match notification.severity {
            Severity::Critical | Severity::Error => error!(
                target: "vitaltrace::notify",
                title = %notification.title,
                severity = %notification.severity,
                "{}",
                notification.message
            ),
            Severity::Warning | Severity::Info => warn!(
                target: "vitaltrace::notify",
                title = %notification.title,
                severity = %notification.severity,
                "{}",
                notification.message
            ),
        }
    }
}
