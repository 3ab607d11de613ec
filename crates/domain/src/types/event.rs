//! Tracking events fanned out to analytics providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EventCategory, EventPriority, Properties};

/// A single analytics event.
///
/// Events are plain values: they are never deduplicated and carry no
/// identity. `priority` and `timestamp` stay `None` until the dispatch
/// manager fills them in right before fan-out (see
/// [`TrackingEvent::with_defaults`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub name: String,
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<EventPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TrackingEvent {
    /// Create an event with no properties and unset priority/timestamp.
    pub fn new(name: impl Into<String>, category: EventCategory) -> Self {
        Self { name: name.into(), category, properties: None, priority: None, timestamp: None }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Add or replace a single property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.get_or_insert_with(Properties::new).insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Fill in missing priority (`Medium`) and timestamp (`now`).
    ///
    /// Values set by the producer are kept as-is.
    pub fn with_defaults(mut self, now: DateTime<Utc>) -> Self {
        self.priority.get_or_insert(EventPriority::default());
        self.timestamp.get_or_insert(now);
        self
    }

    /// Effective priority (`Medium` when unset).
    pub fn effective_priority(&self) -> EventPriority {
        self.priority.unwrap_or_default()
    }

    /// Look up a property value by key.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|props| props.get(key))
    }
}
