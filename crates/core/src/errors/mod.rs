//! Error logger: severity-aware recording, forwarding and user notification.

pub mod details;
pub mod logger;

pub use details::LogDetails;
pub use logger::ErrorLogger;
