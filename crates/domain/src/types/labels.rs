//! Shared enumerations: severities, categories, priorities and statuses.

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Severity of a logged anomaly.
///
/// | Level | Meaning | Surfaced to user |
/// |-------|---------|------------------|
/// | **Info** | Informational | never |
/// | **Warning** | Recoverable or expected anomaly (network blip, threshold breach) | only when flagged |
/// | **Error** | Operation failed, application still usable | only when flagged |
/// | **Critical** | Application-threatening | candidate by default |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl_domain_status_conversions!(Severity {
    Info => "info",
    Warning => "warning",
    Error => "error",
    Critical => "critical",
});

impl Severity {
    /// Severities forwarded to sinks as `error_occurred` events.
    pub fn is_error_class(self) -> bool {
        self >= Self::Error
    }
}

/// Category attached to every [`TrackingEvent`](super::TrackingEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Navigation,
    Interaction,
    Performance,
    Error,
    User,
    System,
    Engagement,
}

impl_domain_status_conversions!(EventCategory {
    Navigation => "navigation",
    Interaction => "interaction",
    Performance => "performance",
    Error => "error",
    User => "user",
    System => "system",
    Engagement => "engagement",
});

/// Functional area an [`AppError`](super::AppError) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorGroup {
    #[default]
    General,
    Ui,
    Network,
    Api,
    Auth,
    Data,
    Validation,
    Performance,
}

impl_domain_status_conversions!(ErrorGroup {
    General => "general",
    Ui => "ui",
    Network => "network",
    Api => "api",
    Auth => "auth",
    Data => "data",
    Validation => "validation",
    Performance => "performance",
});

/// Delivery priority hint for sinks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl_domain_status_conversions!(EventPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// Lifecycle status of a registered provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    #[default]
    Pending,
    Initialized,
    Failed,
    Disabled,
}

impl_domain_status_conversions!(ProviderStatus {
    Pending => "pending",
    Initialized => "initialized",
    Failed => "failed",
    Disabled => "disabled",
});

/// Visibility of the hosting application window or page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl_domain_status_conversions!(Visibility {
    Visible => "visible",
    Hidden => "hidden",
});
