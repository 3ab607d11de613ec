//! Background services

pub mod metrics_cleanup;

pub use metrics_cleanup::MetricsCleanupService;
