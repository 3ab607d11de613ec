//! Port interfaces for the observability pipeline
//!
//! These traits define the boundaries between the pipeline and the sinks or
//! UI surfaces it talks to. Implementations live in the infra crate or in
//! the hosting application.

use async_trait::async_trait;
use vitaltrace_domain::{ProviderResult, Properties, Severity, TrackingEvent};

/// An analytics sink the dispatch manager fans out to.
///
/// Only `initialize` is async. Delivery methods are called synchronously on
/// the producer's thread and must not block; a sink that needs I/O should
/// hand the call to its own queue. Errors and panics from any method are
/// contained by the dispatch manager.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Stable name used in logs and status reports
    fn name(&self) -> &str;

    /// Prepare the sink. `Ok(false)` and `Err(_)` both mark it failed.
    async fn initialize(&self) -> ProviderResult<bool>;

    /// Deliver a single event
    fn track_event(&self, event: &TrackingEvent) -> ProviderResult<()>;

    /// Associate subsequent events with a user
    fn identify(&self, user_id: &str, traits: Option<&Properties>) -> ProviderResult<()>;

    /// Replace the sink's view of the user's properties
    fn set_user_properties(&self, _properties: &Properties) -> ProviderResult<()> {
        Ok(())
    }

    /// Record a page/route view
    fn page_view(&self, _path: &str, _properties: Option<&Properties>) -> ProviderResult<()> {
        Ok(())
    }
}

/// A transient user-facing message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// Surface for showing notifications to the end user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &UserNotification);
}

/// Notifier that drops every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &UserNotification) {
        // No-op
    }
}
