//! Pipeline bootstrap
//!
//! Wires the clock, dispatch manager, error logger, metric tracker and
//! cleanup service from a [`TelemetryConfig`], and registers the console
//! provider when the configuration asks for it.

use std::sync::Arc;

use tracing::info;
use vitaltrace_core::{
    AnalyticsManager, AnalyticsProvider, Clock, ErrorLogger, Notifier, PerformanceTracker,
    SystemClock, TrackerSettings, VisibilitySweep,
};
use vitaltrace_domain::{Result, TelemetryConfig, Visibility};

use crate::notifier::TracingNotifier;
use crate::providers::ConsoleProvider;
use crate::services::MetricsCleanupService;

/// The assembled pipeline.
pub struct Telemetry {
    config: TelemetryConfig,
    analytics: Arc<AnalyticsManager>,
    logger: Arc<ErrorLogger>,
    tracker: PerformanceTracker,
    cleanup: MetricsCleanupService,
}

impl Telemetry {
    /// Build the pipeline on the system clock, logging notifications.
    ///
    /// # Errors
    /// Returns `TelemetryError::Config` when the performance overrides name
    /// an unknown metric type.
    pub fn bootstrap(config: TelemetryConfig) -> Result<Self> {
        Self::bootstrap_with(config, Arc::new(TracingNotifier), Arc::new(SystemClock))
    }

    /// Build the pipeline with a host notifier and clock.
    ///
    /// # Errors
    /// Returns `TelemetryError::Config` when the performance overrides name
    /// an unknown metric type.
    pub fn bootstrap_with(
        config: TelemetryConfig,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let settings = TrackerSettings::from_config(&config.performance)?;

        let analytics = Arc::new(AnalyticsManager::with_clock(Arc::clone(&clock)));
        let logger = Arc::new(
            ErrorLogger::with_config(Arc::clone(&analytics), notifier, &config.errors)
                .with_clock(Arc::clone(&clock)),
        );
        let tracker =
            PerformanceTracker::from_parts(Arc::clone(&analytics), Arc::clone(&logger), clock, settings);
        let cleanup =
            MetricsCleanupService::new(tracker.clone(), config.performance.cleanup_interval());

        let console = config.analytics.console_provider_enabled(config.mode);
        if console {
            analytics.add_provider(Arc::new(ConsoleProvider::new()));
        }

        info!(mode = %config.mode, console, "Telemetry pipeline assembled");

        Ok(Self { config, analytics, logger, tracker, cleanup })
    }

    /// Register an additional provider; call [`Telemetry::start`] afterwards
    /// to initialize it.
    pub fn add_provider(&self, provider: Arc<dyn AnalyticsProvider>) {
        self.analytics.add_provider(provider);
    }

    /// Initialize providers and start background cleanup.
    ///
    /// Returns whether the dispatch manager is ready. Starting twice only
    /// re-initializes pending or failed providers.
    ///
    /// # Errors
    /// Returns `TelemetryError::Internal` if the cleanup task cannot start.
    pub async fn start(&mut self) -> Result<bool> {
        let ready = self.analytics.initialize().await;
        if !self.cleanup.is_running().await {
            self.cleanup.start().await?;
        }
        info!(ready, "Telemetry pipeline started");
        Ok(ready)
    }

    /// Flush buffered metrics, drop stale ones and stop background cleanup.
    ///
    /// Returns the number of metrics flushed.
    ///
    /// # Errors
    /// Returns `TelemetryError::Internal` if the cleanup task does not stop
    /// cleanly.
    pub async fn shutdown(&mut self) -> Result<usize> {
        let sweep = self.tracker.handle_visibility_change(Visibility::Hidden);
        if self.cleanup.is_running().await {
            self.cleanup.stop().await?;
        }
        info!(flushed = sweep.flushed, evicted = sweep.evicted, "Telemetry pipeline shut down");
        Ok(sweep.flushed)
    }

    /// Forward a host visibility change to the tracker.
    pub fn handle_visibility_change(&self, visibility: Visibility) -> VisibilitySweep {
        self.tracker.handle_visibility_change(visibility)
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn analytics(&self) -> &Arc<AnalyticsManager> {
        &self.analytics
    }

    pub fn logger(&self) -> &Arc<ErrorLogger> {
        &self.logger
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    pub async fn is_cleanup_running(&self) -> bool {
        self.cleanup.is_running().await
    }
}
