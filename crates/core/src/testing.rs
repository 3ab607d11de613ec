//! Test doubles for the pipeline ports.
//!
//! Available in this crate's unit tests and to other crates through the
//! `test-utils` feature.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use vitaltrace_domain::{ProviderError, ProviderResult, Properties, TrackingEvent};

use crate::ports::{AnalyticsProvider, Notifier, UserNotification};

/// One call observed by a [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Event(TrackingEvent),
    Identify { user_id: String, traits: Option<Properties> },
    UserProperties(Properties),
    PageView { path: String, properties: Option<Properties> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeliveryMode {
    Record,
    Fail,
    Panic,
}

/// Provider that records every delivered call in order.
///
/// Delivery can be switched to always fail or always panic to exercise the
/// dispatch manager's isolation.
#[derive(Debug)]
pub struct RecordingProvider {
    name: String,
    init_result: ProviderResult<bool>,
    delivery: DeliveryMode,
    init_calls: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            init_result: Ok(true),
            delivery: DeliveryMode::Record,
            init_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Result returned from every `initialize` call
    pub fn with_init_result(mut self, result: ProviderResult<bool>) -> Self {
        self.init_result = result;
        self
    }

    /// Every delivery returns `ProviderError::Delivery`
    pub fn failing_delivery(mut self) -> Self {
        self.delivery = DeliveryMode::Fail;
        self
    }

    /// Every delivery panics
    pub fn panicking_delivery(mut self) -> Self {
        self.delivery = DeliveryMode::Panic;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Event(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.name).collect()
    }

    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    fn record(&self, call: RecordedCall) -> ProviderResult<()> {
        match self.delivery {
            DeliveryMode::Record => {
                self.calls.lock().push(call);
                Ok(())
            }
            DeliveryMode::Fail => Err(ProviderError::Delivery(format!("{} rejects calls", self.name))),
            DeliveryMode::Panic => panic!("{} panicked during delivery", self.name),
        }
    }
}

#[async_trait]
impl AnalyticsProvider for RecordingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> ProviderResult<bool> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.init_result.clone()
    }

    fn track_event(&self, event: &TrackingEvent) -> ProviderResult<()> {
        self.record(RecordedCall::Event(event.clone()))
    }

    fn identify(&self, user_id: &str, traits: Option<&Properties>) -> ProviderResult<()> {
        self.record(RecordedCall::Identify { user_id: user_id.to_string(), traits: traits.cloned() })
    }

    fn set_user_properties(&self, properties: &Properties) -> ProviderResult<()> {
        self.record(RecordedCall::UserProperties(properties.clone()))
    }

    fn page_view(&self, path: &str, properties: Option<&Properties>) -> ProviderResult<()> {
        self.record(RecordedCall::PageView {
            path: path.to_string(),
            properties: properties.cloned(),
        })
    }
}

/// Notifier that keeps every notification it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<UserNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<UserNotification> {
        self.notifications.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &UserNotification) {
        self.notifications.lock().push(notification.clone());
    }
}
