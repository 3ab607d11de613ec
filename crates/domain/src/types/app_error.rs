//! Normalized error records owned by the error logger.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{ErrorGroup, Properties, Severity};

/// Opaque cause attached to an [`AppError`].
pub type ErrorSource = Arc<dyn StdError + Send + Sync + 'static>;

/// A caught error or anomaly, normalized at the logging call site.
///
/// Records are never mutated after they reach the logger; the builder
/// methods consume `self`.
#[derive(Debug, Clone)]
pub struct AppError {
    pub message: String,
    pub code: Option<String>,
    pub severity: Severity,
    pub group: ErrorGroup,
    pub context: Option<Properties>,
    pub source: Option<ErrorSource>,
    pub should_notify_user: bool,
    pub user_message: Option<String>,
    pub user_title: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    /// Create a record with the given severity.
    ///
    /// `should_notify_user` starts as `true` for [`Severity::Critical`] and
    /// `false` otherwise.
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            code: None,
            severity,
            group: ErrorGroup::default(),
            context: None,
            source: None,
            should_notify_user: severity == Severity::Critical,
            user_message: None,
            user_title: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_group(mut self, group: ErrorGroup) -> Self {
        self.group = group;
        self
    }

    pub fn with_context(mut self, context: Properties) -> Self {
        self.context = Some(context);
        self
    }

    /// Add or replace a single context entry.
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.get_or_insert_with(Properties::new).insert(key.into(), value.into());
        self
    }

    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn notify_user(mut self, notify: bool) -> Self {
        self.should_notify_user = notify;
        self
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    pub fn with_user_title(mut self, title: impl Into<String>) -> Self {
        self.user_title = Some(title.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}: {}", self.severity, code, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|err| err as &(dyn StdError + 'static))
    }
}
