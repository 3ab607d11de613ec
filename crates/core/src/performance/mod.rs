//! Metric tracker: start/end timing, thresholds, throttling and TTL cleanup.

pub mod settings;
pub mod tracker;

pub use settings::TrackerSettings;
pub use tracker::{FlushOutcome, PerformanceTracker, VisibilitySweep};
