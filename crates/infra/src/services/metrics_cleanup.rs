//! Periodic metric cleanup service
//!
//! Evicts buffered performance metrics that outlived their TTL on a fixed
//! interval, with explicit lifecycle management.
//!
//! # Features
//!
//! - Periodic `cleanup_metrics` on the configured interval
//! - Restartable after stop
//! - Graceful shutdown with cancellation and a bounded wait

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use vitaltrace_core::PerformanceTracker;
use vitaltrace_domain::{Result, TelemetryError};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Background cleanup of stale metrics
pub struct MetricsCleanupService {
    tracker: PerformanceTracker,
    interval: Duration,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl MetricsCleanupService {
    /// Create a new cleanup service
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(tracker: PerformanceTracker, interval: Duration) -> Self {
        Self {
            tracker,
            interval: interval.max(Duration::from_millis(1)),
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the cleanup service
    ///
    /// Spawns a background task that runs cleanup periodically.
    ///
    /// # Errors
    ///
    /// Returns error if service is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running().await {
            return Err(TelemetryError::Internal("Metrics cleanup service already running".into()));
        }

        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        info!(interval_ms, "Starting metrics cleanup service");

        // Fresh token so the service can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let tracker = self.tracker.clone();
        let interval = self.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::cleanup_loop(tracker, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        Ok(())
    }

    /// Stop the cleanup service gracefully
    ///
    /// Cancels the background task and awaits completion.
    ///
    /// # Errors
    ///
    /// Returns error if service is not running, or the task panicked or
    /// did not finish in time
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<()> {
        if !self.is_running().await {
            return Err(TelemetryError::Internal("Metrics cleanup service not running".into()));
        }

        info!("Stopping metrics cleanup service");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            match tokio::time::timeout(STOP_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(error = %e, "Metrics cleanup task panicked");
                    return Err(TelemetryError::Internal(format!(
                        "Metrics cleanup task panicked: {}",
                        e
                    )));
                }
                Err(_) => {
                    warn!("Metrics cleanup task did not complete within timeout");
                    return Err(TelemetryError::Internal(format!(
                        "Metrics cleanup task did not stop within {:?}",
                        STOP_TIMEOUT
                    )));
                }
            }
        }

        info!("Metrics cleanup service stopped");

        Ok(())
    }

    /// Check if cleanup service is running
    pub async fn is_running(&self) -> bool {
        let guard = self.task_handle.lock().await;
        guard.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Run cleanup once immediately, returning the number of evicted metrics
    pub fn cleanup_once(&self) -> usize {
        self.tracker.cleanup_metrics()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    async fn cleanup_loop(tracker: PerformanceTracker, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Metrics cleanup loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let evicted = tracker.cleanup_metrics();
                    if evicted > 0 {
                        debug!(evicted, "Periodic metrics cleanup completed");
                    }
                }
            }
        }
    }
}

impl Drop for MetricsCleanupService {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
