//! Performance tracker
//!
//! Measures named operations between [`PerformanceTracker::start`] and
//! [`PerformanceTracker::end`] on the injected monotonic clock, reports slow
//! operations through the error logger and forwards `performance_metric`
//! events to the dispatch manager. Reports for the same `(type, name)` pair
//! are throttled per type; throttled measurements stay buffered until the
//! next flush or until they age out.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vitaltrace_domain::constants::{CODE_PERFORMANCE_THRESHOLD_EXCEEDED, EVENT_PERFORMANCE_METRIC};
use vitaltrace_domain::{
    ErrorGroup, EventCategory, EventPriority, MetricHandle, MetricType, PerformanceMetric,
    Properties, TrackingEvent, Visibility,
};

use super::TrackerSettings;
use crate::analytics::AnalyticsManager;
use crate::clock::{Clock, SystemClock};
use crate::errors::{ErrorLogger, LogDetails};

/// Result of [`PerformanceTracker::flush_metrics`].
#[derive(Debug)]
pub enum FlushOutcome {
    /// A flush was spawned on the current Tokio runtime; the handle yields
    /// the number of forwarded metrics.
    Scheduled(JoinHandle<usize>),
    /// No runtime was available, so the flush ran inline.
    Completed(usize),
    /// A scheduled flush has not run yet; nothing was done.
    AlreadyPending,
}

/// What a visibility change did to the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilitySweep {
    pub flushed: usize,
    pub evicted: usize,
}

#[derive(Default)]
struct TrackerState {
    metrics: HashMap<MetricHandle, PerformanceMetric>,
    last_reported: HashMap<(MetricType, String), Instant>,
    settings: TrackerSettings,
}

struct TrackerInner {
    analytics: Arc<AnalyticsManager>,
    logger: Arc<ErrorLogger>,
    clock: Arc<dyn Clock>,
    state: Mutex<TrackerState>,
    sequence: AtomicU64,
    flush_pending: AtomicBool,
}

/// Threshold breach detected while closing a metric.
struct Breach {
    metric: PerformanceMetric,
    threshold: Duration,
}

/// Holds the pending-flush flag; releases it when dropped, including when a
/// scheduled flush is aborted or its runtime shuts down before it runs.
struct PendingFlush {
    tracker: PerformanceTracker,
}

impl Drop for PendingFlush {
    fn drop(&mut self) {
        self.tracker.inner.flush_pending.store(false, Ordering::Release);
    }
}

/// Cheap-to-clone handle over the shared tracker state.
#[derive(Clone)]
pub struct PerformanceTracker {
    inner: Arc<TrackerInner>,
}

impl PerformanceTracker {
    pub fn new(analytics: Arc<AnalyticsManager>, logger: Arc<ErrorLogger>) -> Self {
        Self::from_parts(analytics, logger, Arc::new(SystemClock), TrackerSettings::default())
    }

    pub fn from_parts(
        analytics: Arc<AnalyticsManager>,
        logger: Arc<ErrorLogger>,
        clock: Arc<dyn Clock>,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                analytics,
                logger,
                clock,
                state: Mutex::new(TrackerState { settings, ..TrackerState::default() }),
                sequence: AtomicU64::new(0),
                flush_pending: AtomicBool::new(false),
            }),
        }
    }

    /// Begin measuring `name`.
    ///
    /// When the buffer already holds the per-type cap of `metric_type`
    /// entries, the oldest of that type is evicted first.
    pub fn start(
        &self,
        name: impl Into<String>,
        metric_type: MetricType,
        metadata: Option<Properties>,
    ) -> MetricHandle {
        let name = name.into();
        let clock = &self.inner.clock;
        let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed);
        let handle = MetricHandle::new(metric_type, &name, clock.nanos_since_epoch(), sequence);
        let metric = PerformanceMetric {
            handle: handle.clone(),
            name,
            metric_type,
            start: clock.now(),
            end: None,
            duration: None,
            metadata,
            created_at: clock.utc_now(),
            sequence,
        };

        let mut state = self.inner.state.lock();
        let cap = state.settings.buffer_cap();
        loop {
            let oldest = state
                .metrics
                .values()
                .filter(|m| m.metric_type == metric_type)
                .min_by_key(|m| m.sequence)
                .map(|m| m.handle.clone());
            let count = state.metrics.values().filter(|m| m.metric_type == metric_type).count();
            match oldest {
                Some(oldest) if count >= cap => {
                    state.metrics.remove(&oldest);
                    debug!(metric_type = %metric_type, handle = %oldest, "metric_evicted_over_cap");
                }
                _ => break,
            }
        }
        state.metrics.insert(handle.clone(), metric);
        handle
    }

    /// Finish measuring and return the measured duration.
    ///
    /// Unknown, evicted and already closed handles are logged and yield
    /// `None`.
    pub fn end(&self, handle: &MetricHandle) -> Option<Duration> {
        let now = self.inner.clock.now();

        let (duration, breach, report) = {
            let mut state = self.inner.state.lock();
            let TrackerState { metrics, last_reported, settings } = &mut *state;

            let Some(metric) = metrics.get_mut(handle) else {
                warn!(handle = %handle, "metric_end_unknown_handle");
                return None;
            };
            if metric.duration.is_some() {
                warn!(handle = %handle, "metric_end_already_closed");
                return None;
            }

            let duration = now.saturating_duration_since(metric.start);
            metric.end = Some(now);
            metric.duration = Some(duration);

            let breach = settings
                .threshold(metric.metric_type)
                .filter(|threshold| duration > *threshold)
                .map(|threshold| Breach { metric: metric.clone(), threshold });

            let key = (metric.metric_type, metric.name.clone());
            let window = settings.throttle_window(metric.metric_type);
            let throttled = !window.is_zero()
                && last_reported
                    .get(&key)
                    .is_some_and(|last| now.saturating_duration_since(*last) < window);

            let report = if throttled {
                debug!(handle = %handle, "metric_report_throttled");
                None
            } else {
                last_reported.insert(key, now);
                metrics.remove(handle)
            };
            (duration, breach, report)
        };

        if let Some(breach) = breach {
            self.report_breach(&breach);
        }
        if let Some(metric) = report {
            self.forward(&metric);
        }
        Some(duration)
    }

    /// Time a closure.
    pub fn measure<T>(
        &self,
        name: impl Into<String>,
        metric_type: MetricType,
        metadata: Option<Properties>,
        f: impl FnOnce() -> T,
    ) -> T {
        let handle = self.start(name, metric_type, metadata);
        let output = f();
        self.end(&handle);
        output
    }

    /// Time a future until it completes.
    pub async fn measure_async<F>(
        &self,
        name: impl Into<String>,
        metric_type: MetricType,
        metadata: Option<Properties>,
        future: F,
    ) -> F::Output
    where
        F: Future,
    {
        let handle = self.start(name, metric_type, metadata);
        let output = future.await;
        self.end(&handle);
        output
    }

    pub fn set_threshold(&self, metric_type: MetricType, threshold: Duration) {
        self.inner.state.lock().settings.thresholds.insert(metric_type, threshold);
    }

    /// Override throttle windows for the given types; others keep theirs.
    pub fn set_throttle_config(&self, windows: impl IntoIterator<Item = (MetricType, Duration)>) {
        self.inner.state.lock().settings.throttle.extend(windows);
    }

    /// Takes effect on the next `start`.
    pub fn set_max_metrics_per_type(&self, max: usize) {
        self.inner.state.lock().settings.max_metrics_per_type = max;
    }

    pub fn set_max_age(&self, max_age: Duration) {
        self.inner.state.lock().settings.max_age = max_age;
    }

    pub fn settings(&self) -> TrackerSettings {
        self.inner.state.lock().settings.clone()
    }

    /// Forward every closed metric, throttled or not, without blocking.
    ///
    /// At most one flush is pending at a time. Inside a Tokio runtime the
    /// flush runs on a spawned task after yielding once; otherwise it runs
    /// inline.
    pub fn flush_metrics(&self) -> FlushOutcome {
        if self.inner.flush_pending.swap(true, Ordering::AcqRel) {
            return FlushOutcome::AlreadyPending;
        }

        let pending = PendingFlush { tracker: self.clone() };
        match Handle::try_current() {
            Ok(runtime) => FlushOutcome::Scheduled(runtime.spawn(async move {
                tokio::task::yield_now().await;
                pending.tracker.flush_closed()
            })),
            Err(_) => FlushOutcome::Completed(pending.tracker.flush_closed()),
        }
    }

    /// Evict every metric older than the configured max age.
    ///
    /// Evicted metrics are never reported. Throttle bookkeeping whose window
    /// has passed is dropped as well.
    pub fn cleanup_metrics(&self) -> usize {
        let now_wall = self.inner.clock.utc_now();
        let now = self.inner.clock.now();

        let mut state = self.inner.state.lock();
        let TrackerState { metrics, last_reported, settings } = &mut *state;

        let before = metrics.len();
        metrics.retain(|_, metric| {
            (now_wall - metric.created_at).to_std().map_or(true, |age| age <= settings.max_age)
        });
        let evicted = before - metrics.len();

        last_reported.retain(|(metric_type, _), last| {
            now.saturating_duration_since(*last) < settings.throttle_window(*metric_type)
        });

        if evicted > 0 {
            debug!(evicted, remaining = metrics.len(), "metrics_cleaned_up");
        }
        evicted
    }

    /// React to the host becoming hidden or visible.
    ///
    /// Hidden forces an immediate flush followed by cleanup; visible does
    /// nothing.
    pub fn handle_visibility_change(&self, visibility: Visibility) -> VisibilitySweep {
        match visibility {
            Visibility::Visible => VisibilitySweep::default(),
            Visibility::Hidden => {
                let flushed = self.flush_closed();
                let evicted = self.cleanup_metrics();
                VisibilitySweep { flushed, evicted }
            }
        }
    }

    /// Buffered metrics ordered by creation
    pub fn snapshot(&self) -> Vec<PerformanceMetric> {
        let mut metrics: Vec<PerformanceMetric> =
            self.inner.state.lock().metrics.values().cloned().collect();
        metrics.sort_by_key(|m| m.sequence);
        metrics
    }

    pub fn buffered_len(&self) -> usize {
        self.inner.state.lock().metrics.len()
    }

    fn flush_closed(&self) -> usize {
        let now = self.inner.clock.now();
        let mut closed: Vec<PerformanceMetric> = {
            let mut state = self.inner.state.lock();
            let TrackerState { metrics, last_reported, .. } = &mut *state;

            let handles: Vec<MetricHandle> = metrics
                .values()
                .filter(|m| m.duration.is_some())
                .map(|m| m.handle.clone())
                .collect();
            let closed: Vec<PerformanceMetric> =
                handles.iter().filter_map(|handle| metrics.remove(handle)).collect();
            for metric in &closed {
                last_reported.insert((metric.metric_type, metric.name.clone()), now);
            }
            closed
        };

        closed.sort_by_key(|m| m.sequence);
        for metric in &closed {
            self.forward(metric);
        }
        if !closed.is_empty() {
            debug!(flushed = closed.len(), "metrics_flushed");
        }
        closed.len()
    }

    fn report_breach(&self, breach: &Breach) {
        let metric = &breach.metric;
        let duration_ms = metric.duration_ms().unwrap_or_default();
        let threshold_ms = whole_millis(breach.threshold);

        let mut details = LogDetails::new()
            .code(CODE_PERFORMANCE_THRESHOLD_EXCEEDED)
            .group(ErrorGroup::Performance)
            .context_entry("metric_type", metric.metric_type.to_string())
            .context_entry("metric_name", metric.name.clone())
            .context_entry("duration_ms", duration_ms)
            .context_entry("threshold_ms", threshold_ms);
        if let Some(metadata) = &metric.metadata {
            details = details.context_entry("metadata", Value::Object(metadata.clone()));
        }

        self.inner.logger.warning(
            format!(
                "{} '{}' took {:.1}ms, threshold is {}ms",
                metric.metric_type, metric.name, duration_ms, threshold_ms
            ),
            details,
        );
    }

    fn forward(&self, metric: &PerformanceMetric) {
        let event = TrackingEvent::new(EVENT_PERFORMANCE_METRIC, EventCategory::Performance)
            .with_priority(EventPriority::Low)
            .with_property("metric_type", metric.metric_type.to_string())
            .with_property("metric_name", metric.name.clone())
            .with_property("duration_ms", metric.duration_ms().unwrap_or_default())
            .with_property("metadata", metric.metadata.clone().map(Value::Object));
        self.inner.analytics.track_event(event);
    }
}

/// Milliseconds as `u64`, saturating instead of truncating.
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl fmt::Debug for PerformanceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceTracker")
            .field("buffered", &self.buffered_len())
            .field("flush_pending", &self.inner.flush_pending.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vitaltrace_domain::{ErrorLoggerConfig, Severity};

    use super::*;
    use crate::clock::MockClock;
    use crate::ports::NoopNotifier;
    use crate::testing::RecordingProvider;

    struct Harness {
        tracker: PerformanceTracker,
        logger: Arc<ErrorLogger>,
        sink: Arc<RecordingProvider>,
        clock: MockClock,
    }

    fn build(analytics: Arc<AnalyticsManager>, sink: Arc<RecordingProvider>) -> Harness {
        let clock = MockClock::new();
        let logger = Arc::new(ErrorLogger::with_config(
            Arc::clone(&analytics),
            Arc::new(NoopNotifier),
            &ErrorLoggerConfig::default(),
        ));
        let tracker = PerformanceTracker::from_parts(
            analytics,
            Arc::clone(&logger),
            Arc::new(clock.clone()),
            TrackerSettings::default(),
        );
        Harness { tracker, logger, sink, clock }
    }

    async fn harness() -> Harness {
        let analytics = Arc::new(AnalyticsManager::new());
        let sink = Arc::new(RecordingProvider::new("sink"));
        analytics.add_provider(sink.clone());
        assert!(analytics.initialize().await);
        build(analytics, sink)
    }

    /// Harness for tests that must run outside any Tokio runtime.
    fn harness_without_runtime() -> Harness {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let analytics = Arc::new(AnalyticsManager::new());
        let sink = Arc::new(RecordingProvider::new("sink"));
        analytics.add_provider(sink.clone());
        assert!(runtime.block_on(analytics.initialize()));
        build(analytics, sink)
    }

    fn props(value: serde_json::Value) -> Properties {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_end_forwards_measured_duration() {
        let h = harness().await;
        let handle = h.tracker.start(
            "/medications",
            MetricType::RouteChange,
            Some(props(json!({ "from": "/home" }))),
        );
        h.clock.advance_millis(120);

        assert_eq!(h.tracker.end(&handle), Some(Duration::from_millis(120)));
        assert_eq!(h.tracker.buffered_len(), 0);

        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, EVENT_PERFORMANCE_METRIC);
        assert_eq!(events[0].category, EventCategory::Performance);
        assert_eq!(events[0].priority, Some(EventPriority::Low));
        assert_eq!(events[0].property("metric_type"), Some(&json!("route_change")));
        assert_eq!(events[0].property("metric_name"), Some(&json!("/medications")));
        assert_eq!(events[0].property("duration_ms"), Some(&json!(120.0)));
        assert_eq!(events[0].property("metadata"), Some(&json!({ "from": "/home" })));
    }

    /// Validates that bad handles never fail the caller.
    ///
    /// Assertions:
    /// - An unknown handle yields `None` and forwards nothing.
    /// - Ending the same handle twice yields `None` the second time.
    #[tokio::test]
    async fn test_unknown_and_repeated_end() {
        let h = harness().await;
        let bogus = MetricHandle::new(MetricType::ApiRequest, "missing", 0, 999);
        assert_eq!(h.tracker.end(&bogus), None);
        assert!(h.sink.events().is_empty());

        h.tracker.set_throttle_config([(MetricType::ApiRequest, Duration::from_secs(5))]);
        let first = h.tracker.start("fetch_doses", MetricType::ApiRequest, None);
        h.tracker.end(&first);
        let second = h.tracker.start("fetch_doses", MetricType::ApiRequest, None);
        assert!(h.tracker.end(&second).is_some());
        assert_eq!(h.tracker.end(&second), None);
    }

    /// Validates per-pair throttling with the 1 s interaction window.
    ///
    /// Assertions:
    /// - Two reports 999 ms apart produce one event.
    /// - Two reports 1000 ms apart produce two events.
    #[tokio::test]
    async fn test_throttle_window_boundary() {
        let h = harness().await;
        let tap = |tracker: &PerformanceTracker| {
            let handle = tracker.start("log_dose", MetricType::UserInteraction, None);
            tracker.end(&handle);
        };

        tap(&h.tracker);
        h.clock.advance_millis(999);
        tap(&h.tracker);
        assert_eq!(h.sink.events().len(), 1);
        assert_eq!(h.tracker.buffered_len(), 1);

        h.clock.advance_millis(1);
        tap(&h.tracker);
        assert_eq!(h.sink.events().len(), 2);
    }

    #[tokio::test]
    async fn test_throttling_is_per_name() {
        let h = harness().await;
        for name in ["save", "cancel"] {
            let handle = h.tracker.start(name, MetricType::UserInteraction, None);
            h.tracker.end(&handle);
        }
        assert_eq!(h.sink.events().len(), 2);
    }

    /// Validates threshold breaches.
    ///
    /// Assertions:
    /// - Exactly one WARNING with the threshold code is logged.
    /// - The context carries type, name, duration and threshold.
    /// - The metric itself is still forwarded.
    #[tokio::test]
    async fn test_threshold_breach_logs_one_warning() {
        let h = harness().await;
        let handle = h.tracker.start("DoseList", MetricType::ComponentRender, None);
        h.clock.advance_millis(150);
        h.tracker.end(&handle);

        let warnings = h.logger.recent_errors();
        assert_eq!(warnings.len(), 1);
        let warning = &warnings[0];
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.code.as_deref(), Some(CODE_PERFORMANCE_THRESHOLD_EXCEEDED));
        assert_eq!(warning.group, ErrorGroup::Performance);

        let context = warning.context.clone().unwrap_or_default();
        assert_eq!(context.get("metric_type"), Some(&json!("component_render")));
        assert_eq!(context.get("metric_name"), Some(&json!("DoseList")));
        assert_eq!(context.get("duration_ms"), Some(&json!(150.0)));
        assert_eq!(context.get("threshold_ms"), Some(&json!(100)));

        assert_eq!(h.sink.event_names(), vec![EVENT_PERFORMANCE_METRIC]);
    }

    #[test]
    fn test_whole_millis_saturates() {
        assert_eq!(whole_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_duration_at_threshold_is_not_a_breach() {
        let h = harness().await;
        h.tracker.set_threshold(MetricType::ApiRequest, Duration::from_millis(500));
        let handle = h.tracker.start("fetch_doses", MetricType::ApiRequest, None);
        h.clock.advance_millis(500);
        h.tracker.end(&handle);

        assert!(h.logger.recent_errors().is_empty());
    }

    #[tokio::test]
    async fn test_cap_evicts_oldest_of_same_type() {
        let h = harness().await;
        h.tracker.set_max_metrics_per_type(2);

        let route = h.tracker.start("/home", MetricType::RouteChange, None);
        let first = h.tracker.start("a", MetricType::ApiRequest, None);
        let second = h.tracker.start("b", MetricType::ApiRequest, None);
        let third = h.tracker.start("c", MetricType::ApiRequest, None);

        let buffered: Vec<MetricHandle> =
            h.tracker.snapshot().into_iter().map(|m| m.handle).collect();
        assert_eq!(buffered, vec![route, second, third]);
        assert_eq!(h.tracker.end(&first), None);
    }

    /// Validates TTL cleanup on simulated time.
    ///
    /// Assertions:
    /// - Entries older than 30 minutes are evicted, younger ones kept.
    /// - Evicted entries are never delivered, even when ended later.
    #[tokio::test]
    async fn test_cleanup_evicts_stale_metrics() {
        let h = harness().await;
        let stale = h.tracker.start("report.pdf", MetricType::ResourceLoad, None);
        h.clock.advance(Duration::from_secs(20 * 60));
        let fresh = h.tracker.start("logo.png", MetricType::ResourceLoad, None);
        h.clock.advance(Duration::from_secs(11 * 60));

        assert_eq!(h.tracker.cleanup_metrics(), 1);
        assert_eq!(h.tracker.end(&stale), None);
        assert!(h.tracker.end(&fresh).is_some());

        let names: Vec<serde_json::Value> = h
            .sink
            .events()
            .iter()
            .filter_map(|event| event.property("metric_name").cloned())
            .collect();
        assert_eq!(names, vec![json!("logo.png")]);
    }

    #[tokio::test]
    async fn test_flush_is_not_reentrant() {
        let h = harness().await;
        let first = h.tracker.flush_metrics();
        assert!(matches!(h.tracker.flush_metrics(), FlushOutcome::AlreadyPending));

        let FlushOutcome::Scheduled(task) = first else {
            panic!("expected a scheduled flush inside the runtime");
        };
        assert_eq!(task.await.unwrap(), 0);
        assert!(matches!(h.tracker.flush_metrics(), FlushOutcome::Scheduled(_)));
    }

    /// Validates that a flush that never runs does not block later flushes.
    ///
    /// Assertions:
    /// - Dropping the runtime before the scheduled flush is polled releases it.
    /// - The next flush outside any runtime runs inline and reports the
    ///   closed metric.
    #[test]
    fn test_flush_released_when_runtime_drops() {
        let h = harness_without_runtime();
        for _ in 0..2 {
            let handle = h.tracker.start("log_dose", MetricType::UserInteraction, None);
            h.tracker.end(&handle);
        }

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let scheduled = runtime.block_on(async { h.tracker.flush_metrics() });
        assert!(matches!(scheduled, FlushOutcome::Scheduled(_)));
        drop(scheduled);
        drop(runtime);

        assert!(!matches!(h.tracker.flush_metrics(), FlushOutcome::AlreadyPending));
        assert!(matches!(h.tracker.flush_metrics(), FlushOutcome::Completed(0)));
        assert_eq!(h.sink.events().len(), 2);
    }

    #[tokio::test]
    async fn test_aborted_flush_releases_pending_flag() {
        let h = harness().await;
        let FlushOutcome::Scheduled(task) = h.tracker.flush_metrics() else {
            panic!("expected a scheduled flush inside the runtime");
        };
        task.abort();
        let _ = task.await;

        assert!(matches!(h.tracker.flush_metrics(), FlushOutcome::Scheduled(_)));
    }

    /// Validates that flushing reports throttled entries exactly once.
    ///
    /// Assertions:
    /// - The throttled entry is forwarded by the first flush.
    /// - A second flush forwards nothing.
    #[test]
    fn test_flush_reports_throttled_entries_once() {
        let h = harness_without_runtime();
        for _ in 0..2 {
            let handle = h.tracker.start("log_dose", MetricType::UserInteraction, None);
            h.tracker.end(&handle);
        }
        assert_eq!(h.sink.events().len(), 1);

        assert!(matches!(h.tracker.flush_metrics(), FlushOutcome::Completed(1)));
        assert!(matches!(h.tracker.flush_metrics(), FlushOutcome::Completed(0)));
        assert_eq!(h.sink.events().len(), 2);
        assert_eq!(h.tracker.buffered_len(), 0);
    }

    #[tokio::test]
    async fn test_flush_leaves_open_metrics() {
        let h = harness().await;
        h.tracker.start("sync", MetricType::ApiRequest, None);

        let FlushOutcome::Scheduled(task) = h.tracker.flush_metrics() else {
            panic!("expected a scheduled flush inside the runtime");
        };
        assert_eq!(task.await.unwrap(), 0);
        assert_eq!(h.tracker.buffered_len(), 1);
    }

    #[tokio::test]
    async fn test_hidden_flushes_and_cleans_up() {
        let h = harness().await;
        h.tracker.start("upload", MetricType::ApiRequest, None);
        h.clock.advance(Duration::from_secs(31 * 60));
        for _ in 0..2 {
            let handle = h.tracker.start("Chart", MetricType::ComponentRender, None);
            h.tracker.end(&handle);
        }

        assert_eq!(h.tracker.handle_visibility_change(Visibility::Visible), VisibilitySweep::default());
        let sweep = h.tracker.handle_visibility_change(Visibility::Hidden);
        assert_eq!(sweep, VisibilitySweep { flushed: 1, evicted: 1 });
        assert_eq!(h.tracker.buffered_len(), 0);
        assert_eq!(h.sink.events().len(), 2);
    }

    #[tokio::test]
    async fn test_measure_wraps_closure_and_future() {
        let h = harness().await;
        let value = h.tracker.measure("parse", MetricType::AppLoad, None, || {
            h.clock.advance_millis(40);
            7
        });
        assert_eq!(value, 7);

        let clock = h.clock.clone();
        let output = h
            .tracker
            .measure_async("boot", MetricType::AppReady, None, async move {
                clock.advance_millis(250);
                "ready"
            })
            .await;
        assert_eq!(output, "ready");

        let durations: Vec<serde_json::Value> = h
            .sink
            .events()
            .iter()
            .filter_map(|event| event.property("duration_ms").cloned())
            .collect();
        assert_eq!(durations, vec![json!(40.0), json!(250.0)]);
    }
}
