//! Optional fields accepted by the severity wrappers on [`ErrorLogger`].
//!
//! [`ErrorLogger`]: super::ErrorLogger

use serde_json::Value;
use vitaltrace_domain::{AppError, ErrorGroup, ErrorSource, Properties, Severity};

/// Everything about an error record except its message and severity.
#[derive(Debug, Clone, Default)]
pub struct LogDetails {
    pub code: Option<String>,
    pub group: Option<ErrorGroup>,
    pub context: Option<Properties>,
    pub source: Option<ErrorSource>,
    /// Overrides the severity's default notify flag when set.
    pub notify_user: Option<bool>,
    pub user_message: Option<String>,
    pub user_title: Option<String>,
}

impl LogDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn group(mut self, group: ErrorGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn context(mut self, context: Properties) -> Self {
        self.context = Some(context);
        self
    }

    pub fn context_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.get_or_insert_with(Properties::new).insert(key.into(), value.into());
        self
    }

    pub fn source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn notify_user(mut self, notify: bool) -> Self {
        self.notify_user = Some(notify);
        self
    }

    pub fn user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    pub fn user_title(mut self, title: impl Into<String>) -> Self {
        self.user_title = Some(title.into());
        self
    }

    /// Build the record for `message` at `severity`.
    pub fn into_error(self, message: impl Into<String>, severity: Severity) -> AppError {
        let mut error = AppError::new(message, severity);
        error.code = self.code;
        error.group = self.group.unwrap_or_default();
        error.context = self.context;
        error.source = self.source;
        if let Some(notify) = self.notify_user {
            error.should_notify_user = notify;
        }
        error.user_message = self.user_message;
        error.user_title = self.user_title;
        error
    }
}
