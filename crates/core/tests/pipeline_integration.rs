//! End-to-end behavior of the manager, tracker and logger wired together.

mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use support::{EventSink, FlakySink, Pipeline};
use vitaltrace_core::{AnalyticsProvider, FlushOutcome, LogDetails, TrackerSettings};
use vitaltrace_domain::constants::{
    CODE_PERFORMANCE_THRESHOLD_EXCEEDED, EVENT_ERROR_OCCURRED, EVENT_PERFORMANCE_METRIC,
};
use vitaltrace_domain::{
    ErrorLoggerConfig, EventCategory, MetricType, ProviderStatus, Severity, TrackingEvent,
    Visibility,
};

/// Validates that everything produced before readiness is replayed once.
///
/// Assertions:
/// - Events, identity and a forwarded error arrive in call order.
/// - Nothing is delivered twice after a second `initialize`.
#[tokio::test]
async fn test_pre_init_calls_replay_in_order() {
    let pipeline = Pipeline::new();
    let sink = EventSink::named("warehouse");
    pipeline.analytics.add_provider(sink.clone());

    pipeline.analytics.track_event(TrackingEvent::new("app_opened", EventCategory::System));
    pipeline.analytics.identify("user-42", None);
    pipeline.logger.error("profile fetch failed", LogDetails::new());
    let handle = pipeline.tracker.start("/today", MetricType::RouteChange, None);
    pipeline.clock.advance_millis(80);
    pipeline.tracker.end(&handle);
    assert_eq!(pipeline.analytics.pending_len(), 4);

    assert!(pipeline.analytics.initialize().await);
    assert!(pipeline.analytics.initialize().await);

    assert_eq!(
        sink.names(),
        vec!["app_opened", EVENT_ERROR_OCCURRED, EVENT_PERFORMANCE_METRIC]
    );
    assert_eq!(sink.identities(), vec!["user-42"]);
    assert_eq!(pipeline.analytics.pending_len(), 0);
}

#[tokio::test]
async fn test_failed_sink_blocks_readiness_until_retry() {
    let pipeline = Pipeline::new();
    let healthy = EventSink::named("healthy");
    pipeline.analytics.add_provider(healthy.clone());
    pipeline.analytics.add_provider(FlakySink::failing_init(1));

    pipeline.analytics.track_event(TrackingEvent::new("queued", EventCategory::System));
    assert!(!pipeline.analytics.initialize().await);
    assert!(healthy.names().is_empty());
    assert_eq!(pipeline.analytics.pending_len(), 1);

    assert!(pipeline.analytics.initialize().await);
    assert_eq!(healthy.names(), vec!["queued"]);
    assert!(pipeline
        .analytics
        .provider_statuses()
        .iter()
        .all(|(_, status)| *status == ProviderStatus::Initialized));
}

/// Validates sink isolation across all three components.
///
/// Assertions:
/// - A panicking sink does not stop delivery to the sink after it.
/// - Callers of the tracker and logger see no failure.
#[tokio::test]
async fn test_panicking_sink_is_isolated() {
    let pipeline = Pipeline::new();
    let healthy = EventSink::named("healthy");
    let exploding: Arc<dyn AnalyticsProvider> = FlakySink::exploding();
    pipeline.analytics.add_provider(exploding);
    let pipeline = pipeline.ready_with(healthy.clone()).await;

    pipeline.analytics.identify("user-7", None);
    pipeline.logger.critical("storage unavailable", LogDetails::new().notify_user(false));
    assert!(pipeline.tracker.measure("boot", MetricType::AppLoad, None, || true));

    assert_eq!(healthy.identities(), vec!["user-7"]);
    assert_eq!(healthy.names(), vec![EVENT_ERROR_OCCURRED, EVENT_PERFORMANCE_METRIC]);
}

#[tokio::test]
async fn test_late_sink_receives_identity_only() {
    let pipeline = Pipeline::new().ready_with(EventSink::named("first")).await;
    pipeline.analytics.identify("user-9", None);
    pipeline.analytics.track_event(TrackingEvent::new("before_late", EventCategory::User));

    let late = EventSink::named("late");
    pipeline.analytics.add_provider(late.clone());
    assert!(pipeline.analytics.initialize().await);
    pipeline.analytics.track_event(TrackingEvent::new("after_late", EventCategory::User));

    assert_eq!(late.identities(), vec!["user-9"]);
    assert_eq!(late.names(), vec!["after_late"]);
}

/// Validates throttling on simulated time with a 1 s window.
///
/// Assertions:
/// - Reports under 1000 ms apart produce one event.
/// - Reports 1000 ms or more apart produce two events.
#[tokio::test]
async fn test_throttling_on_simulated_time() {
    for (gap_ms, expected) in [(500_u64, 1_usize), (999, 1), (1_000, 2), (1_500, 2)] {
        let sink = EventSink::named("sink");
        let pipeline = Pipeline::new().ready_with(sink.clone()).await;

        let first = pipeline.tracker.start("refill_button", MetricType::UserInteraction, None);
        pipeline.tracker.end(&first);
        pipeline.clock.advance_millis(gap_ms);
        let second = pipeline.tracker.start("refill_button", MetricType::UserInteraction, None);
        pipeline.tracker.end(&second);

        assert_eq!(sink.names().len(), expected, "gap of {gap_ms} ms");
    }
}

#[tokio::test]
async fn test_threshold_breach_yields_single_warning() {
    let sink = EventSink::named("sink");
    let pipeline = Pipeline::new().ready_with(sink.clone()).await;

    let handle = pipeline.tracker.start("GET /doses", MetricType::ApiRequest, None);
    pipeline.clock.advance_millis(2_500);
    assert_eq!(pipeline.tracker.end(&handle), Some(Duration::from_millis(2_500)));

    let recorded = pipeline.logger.recent_errors();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].severity, Severity::Warning);
    assert_eq!(recorded[0].code.as_deref(), Some(CODE_PERFORMANCE_THRESHOLD_EXCEEDED));

    // Warnings are not forwarded as error events
    assert_eq!(sink.names(), vec![EVENT_PERFORMANCE_METRIC]);
    assert!(pipeline.toasts.shown().is_empty());
}

/// Validates TTL eviction with a simulated clock.
///
/// Assertions:
/// - An entry older than 30 minutes is evicted by cleanup.
/// - It is never delivered, even by a later flush.
#[tokio::test]
async fn test_ttl_eviction_is_never_delivered() {
    let sink = EventSink::named("sink");
    let pipeline = Pipeline::new().ready_with(sink.clone()).await;

    let handle = pipeline.tracker.start("hero.jpg", MetricType::ResourceLoad, None);
    pipeline.clock.advance(Duration::from_secs(30 * 60 + 1));

    assert_eq!(pipeline.tracker.cleanup_metrics(), 1);
    assert_eq!(pipeline.tracker.end(&handle), None);
    if let FlushOutcome::Scheduled(task) = pipeline.tracker.flush_metrics() {
        assert_eq!(task.await.unwrap(), 0);
    }
    assert!(sink.names().is_empty());
}

#[tokio::test]
async fn test_hidden_visibility_flushes_throttled_metrics() {
    let sink = EventSink::named("sink");
    let pipeline = Pipeline::new().ready_with(sink.clone()).await;
    for _ in 0..3 {
        let handle = pipeline.tracker.start("MedCard", MetricType::ComponentRender, None);
        pipeline.tracker.end(&handle);
    }
    assert_eq!(sink.names().len(), 1);

    let sweep = pipeline.tracker.handle_visibility_change(Visibility::Hidden);
    assert_eq!(sweep.flushed, 2);
    assert_eq!(sink.names().len(), 3);
}

#[test]
fn test_flush_runs_inline_without_runtime() {
    let sink = EventSink::named("sink");
    let pipeline = tokio_test::block_on(Pipeline::new().ready_with(sink.clone()));
    for _ in 0..2 {
        let handle = pipeline.tracker.start("fetch_plan", MetricType::ApiRequest, None);
        pipeline.tracker.end(&handle);
    }

    assert!(matches!(pipeline.tracker.flush_metrics(), FlushOutcome::Completed(1)));
    assert_eq!(sink.names().len(), 2);
}

/// Validates notification gating end to end.
///
/// Assertions:
/// - INFO never produces a toast, flagged or not.
/// - Unflagged WARNING and ERROR records stay silent.
/// - Flagged WARNING and ERROR records and unflagged CRITICAL produce toasts.
/// - A toast never carries the technical message.
#[tokio::test]
async fn test_notification_gating() {
    let pipeline = Pipeline::new().ready_with(EventSink::named("sink")).await;

    pipeline.logger.info("cache primed", LogDetails::new().notify_user(true));
    pipeline.logger.warning("slow network", LogDetails::new());
    pipeline.logger.error("save failed", LogDetails::new());
    assert!(pipeline.toasts.shown().is_empty());

    pipeline.logger.warning("slow network", LogDetails::new().notify_user(true));
    pipeline.logger.error("save failed", LogDetails::new().notify_user(true));
    pipeline.logger.critical("heap corrupted near 0xdead", LogDetails::new());

    let shown = pipeline.toasts.shown();
    let severities: Vec<Severity> = shown.iter().map(|n| n.severity).collect();
    assert_eq!(severities, vec![Severity::Warning, Severity::Error, Severity::Critical]);
    assert!(shown.iter().all(|n| !n.message.contains("0xdead")));
}

#[tokio::test]
async fn test_error_floor_from_config() {
    let pipeline = Pipeline::with_config(
        ErrorLoggerConfig { notify_min_severity: Severity::Error, ..Default::default() },
        TrackerSettings::default(),
    )
    .ready_with(EventSink::named("sink"))
    .await;

    pipeline.logger.warning("slow network", LogDetails::new().notify_user(true));
    pipeline.logger.error(
        "save failed",
        LogDetails::new().notify_user(true).user_message("Your changes were not saved."),
    );

    let shown = pipeline.toasts.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].message, "Your changes were not saved.");
}

#[tokio::test]
async fn test_metric_metadata_reaches_sinks() {
    let sink = EventSink::named("sink");
    let pipeline = Pipeline::new().ready_with(sink.clone()).await;

    let metadata = json!({ "status": 200 }).as_object().cloned();
    let handle = pipeline.tracker.start("GET /plan", MetricType::ApiRequest, metadata);
    pipeline.clock.advance_millis(35);
    pipeline.tracker.end(&handle);

    let event = sink.events().remove(0);
    assert_eq!(event.property("metadata"), Some(&json!({ "status": 200 })));
    assert_eq!(event.property("duration_ms"), Some(&json!(35.0)));
}
