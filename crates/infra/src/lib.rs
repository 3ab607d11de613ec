//! # VitalTrace Infrastructure
//!
//! Concrete adapters and runtime wiring for the pipeline.
//!
//! This crate contains:
//! - Configuration loading (environment, JSON, TOML)
//! - Logging initialization
//! - The console analytics provider and a logging notifier
//! - The periodic metric cleanup service
//! - [`Telemetry`], which assembles everything
//!
//! ## Architecture
//! - Implements traits defined in `vitaltrace-core`
//! - Contains all "impure" code (environment, files, background tasks)

pub mod config;
pub mod logging;
pub mod notifier;
pub mod providers;
pub mod services;
pub mod telemetry;

// Re-export commonly used items
pub use logging::init_logging;
pub use notifier::TracingNotifier;
pub use providers::ConsoleProvider;
pub use services::MetricsCleanupService;
pub use telemetry::Telemetry;
