//! Analytics dispatch: the manager and its provider call channels.

pub mod manager;

pub use manager::AnalyticsManager;

/// Provider operation, used to label log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Initialize,
    Event,
    Identify,
    UserProperties,
    PageView,
}

vitaltrace_domain::impl_domain_status_conversions!(Channel {
    Initialize => "initialize",
    Event => "event",
    Identify => "identify",
    UserProperties => "user_properties",
    PageView => "page_view",
});
