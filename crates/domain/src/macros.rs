//! Macro for implementing Display and FromStr for label enums
//!
//! Every enum that crosses a sink boundary (severity, category, priority,
//! provider status, metric type) has one stable string label. This macro
//! generates both conversions from a single mapping.
//!
//! # Example
//!
//! ```rust
//! use vitaltrace_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Event,
//!     Identify,
//! }
//!
//! impl_domain_status_conversions!(Channel {
//!     Event => "event",
//!     Identify => "identify",
//! });
//!
//! assert_eq!(Channel::Event.to_string(), "event");
//! assert_eq!("IDENTIFY".parse::<Channel>().unwrap(), Channel::Identify);
//! ```

/// Implements Display and FromStr traits for label enums
///
/// This macro generates:
/// - Display trait: writes the configured label
/// - FromStr trait: parses case-insensitive labels back to enum variants
///
/// Labels must be lowercase for parsing to round-trip.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}
