//! Development sink that writes every analytics call to the log.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use vitaltrace_core::AnalyticsProvider;
use vitaltrace_domain::constants::CONSOLE_PROVIDER_NAME;
use vitaltrace_domain::{ProviderResult, Properties, TrackingEvent};

/// Writes one structured record per call under the `vitaltrace::console`
/// target. Never fails.
#[derive(Debug, Default)]
pub struct ConsoleProvider {
    records: AtomicU64,
}

impl ConsoleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records written so far
    pub fn records_written(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    fn written(&self) -> ProviderResult<()> {
        self.records.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn render(properties: Option<&Properties>) -> String {
    properties.map_or_else(|| "{}".to_string(), |props| Value::Object(props.clone()).to_string())
}

#[async_trait]
impl AnalyticsProvider for ConsoleProvider {
    fn name(&self) -> &str {
        CONSOLE_PROVIDER_NAME
    }

    async fn initialize(&self) -> ProviderResult<bool> {
        info!(target: "vitaltrace::console", "console_provider_initialized");
        Ok(true)
    }

    fn track_event(&self, event: &TrackingEvent) -> ProviderResult<()> {
        info!(
            target: "vitaltrace::console",
            event = %event.name,
            category = %event.category,
            priority = %event.effective_priority(),
            timestamp = ?event.timestamp,
            properties = %render(event.properties.as_ref()),
            "track_event"
        );
        self.written()
    }

    fn identify(&self, user_id: &str, traits: Option<&Properties>) -> ProviderResult<()> {
        info!(
            target: "vitaltrace::console",
            user_id,
            traits = %render(traits),
            "identify"
        );
        self.written()
    }

    fn set_user_properties(&self, properties: &Properties) -> ProviderResult<()> {
        info!(
            target: "vitaltrace::console",
            properties = %render(Some(properties)),
            "set_user_properties"
        );
        self.written()
    }

    fn page_view(&self, path: &str, properties: Option<&Properties>) -> ProviderResult<()> {
        info!(
            target: "vitaltrace::console",
            path,
            properties = %render(properties),
            "page_view"
        );
        self.written()
    }
}
