//! # VitalTrace Domain
//!
//! Value types shared by the observability pipeline.
//!
//! This crate contains:
//! - Severities, categories, priorities and provider statuses
//! - `TrackingEvent`, `AppError` and `PerformanceMetric`
//! - Error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other VitalTrace crates
//! - Only external dependencies allowed
//! - Pure data structures, no runtime

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
