//! # VitalTrace Core
//!
//! The observability pipeline itself, free of concrete sinks and I/O.
//!
//! This crate contains:
//! - [`AnalyticsManager`]: fan-out of events to analytics providers
//! - [`PerformanceTracker`]: start/end timing with thresholds and throttling
//! - [`ErrorLogger`]: severity-aware error recording and notification
//! - Port traits for providers and user notification
//!
//! ## Architecture Principles
//! - Only depends on `vitaltrace-domain`
//! - Sinks and UI surfaces come in through the traits in [`ports`]
//! - Time comes in through [`clock::Clock`]

pub mod analytics;
pub mod clock;
pub mod collections;
pub mod errors;
pub mod performance;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use analytics::AnalyticsManager;
pub use clock::{Clock, MockClock, SystemClock};
pub use errors::{ErrorLogger, LogDetails};
pub use performance::{FlushOutcome, PerformanceTracker, TrackerSettings, VisibilitySweep};
pub use ports::{AnalyticsProvider, NoopNotifier, Notifier, UserNotification};
