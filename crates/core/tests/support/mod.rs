//! Shared test helpers for `vitaltrace-core` integration tests.
//!
//! A [`Pipeline`] wires the manager, logger and tracker together on a
//! [`MockClock`], with lightweight sinks that record what they receive.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use vitaltrace_core::{
    AnalyticsManager, AnalyticsProvider, ErrorLogger, MockClock, Notifier, PerformanceTracker,
    TrackerSettings, UserNotification,
};
use vitaltrace_domain::{
    ErrorLoggerConfig, ProviderError, ProviderResult, Properties, TrackingEvent,
};

/// Sink that keeps every event it receives.
#[derive(Default)]
pub struct EventSink {
    name: String,
    events: Mutex<Vec<TrackingEvent>>,
    identities: Mutex<Vec<String>>,
}

impl EventSink {
    pub fn named(name: &str) -> Arc<Self> {
        Arc::new(Self { name: name.to_string(), ..Self::default() })
    }

    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|event| event.name.clone()).collect()
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().clone()
    }

    pub fn identities(&self) -> Vec<String> {
        self.identities.lock().clone()
    }
}

#[async_trait]
impl AnalyticsProvider for EventSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> ProviderResult<bool> {
        Ok(true)
    }

    fn track_event(&self, event: &TrackingEvent) -> ProviderResult<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn identify(&self, user_id: &str, _traits: Option<&Properties>) -> ProviderResult<()> {
        self.identities.lock().push(user_id.to_string());
        Ok(())
    }
}

/// Sink whose first `failures` initializations fail; delivery always panics
/// when `explode` is set.
pub struct FlakySink {
    failures: usize,
    explode: bool,
    attempts: AtomicUsize,
}

impl FlakySink {
    pub fn failing_init(failures: usize) -> Arc<Self> {
        Arc::new(Self { failures, explode: false, attempts: AtomicUsize::new(0) })
    }

    pub fn exploding() -> Arc<Self> {
        Arc::new(Self { failures: 0, explode: true, attempts: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl AnalyticsProvider for FlakySink {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn initialize(&self) -> ProviderResult<bool> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(ProviderError::Initialization(format!("attempt {attempt} refused")));
        }
        Ok(true)
    }

    fn track_event(&self, _event: &TrackingEvent) -> ProviderResult<()> {
        if self.explode {
            panic!("sink exploded");
        }
        Ok(())
    }

    fn identify(&self, _user_id: &str, _traits: Option<&Properties>) -> ProviderResult<()> {
        if self.explode {
            panic!("sink exploded");
        }
        Ok(())
    }
}

/// Notifier that records toasts.
#[derive(Default)]
pub struct ToastSpy {
    shown: Mutex<Vec<UserNotification>>,
}

impl ToastSpy {
    pub fn shown(&self) -> Vec<UserNotification> {
        self.shown.lock().clone()
    }
}

impl Notifier for ToastSpy {
    fn notify(&self, notification: &UserNotification) {
        self.shown.lock().push(notification.clone());
    }
}

/// Fully wired pipeline on simulated time.
pub struct Pipeline {
    pub clock: MockClock,
    pub analytics: Arc<AnalyticsManager>,
    pub logger: Arc<ErrorLogger>,
    pub tracker: PerformanceTracker,
    pub toasts: Arc<ToastSpy>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(ErrorLoggerConfig::default(), TrackerSettings::default())
    }

    pub fn with_config(errors: ErrorLoggerConfig, settings: TrackerSettings) -> Self {
        let clock = MockClock::new();
        let analytics = Arc::new(AnalyticsManager::with_clock(Arc::new(clock.clone())));
        let toasts = Arc::new(ToastSpy::default());
        let logger = Arc::new(
            ErrorLogger::with_config(Arc::clone(&analytics), toasts.clone(), &errors)
                .with_clock(Arc::new(clock.clone())),
        );
        let tracker = PerformanceTracker::from_parts(
            Arc::clone(&analytics),
            Arc::clone(&logger),
            Arc::new(clock.clone()),
            settings,
        );
        Self { clock, analytics, logger, tracker, toasts }
    }

    /// Register `sink` and initialize the manager.
    pub async fn ready_with(self, sink: Arc<dyn AnalyticsProvider>) -> Self {
        self.analytics.add_provider(sink);
        assert!(self.analytics.initialize().await, "pipeline failed to become ready");
        self
    }
}
