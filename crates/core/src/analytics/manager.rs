//! Dispatch manager: fan-out of analytics calls to pluggable providers.
//!
//! Calls made before [`AnalyticsManager::initialize`] succeeds are queued in
//! arrival order and replayed once every provider is ready. Each provider
//! call is isolated: an error result or a panic is logged and the remaining
//! providers still receive the call.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use vitaltrace_domain::{ProviderResult, ProviderStatus, Properties, TrackingEvent};

use super::Channel;
use crate::clock::{Clock, SystemClock};
use crate::ports::AnalyticsProvider;

/// A call waiting for the manager to become ready.
#[derive(Debug, Clone, PartialEq)]
enum PendingCall {
    Event(TrackingEvent),
    Identify { user_id: String, traits: Option<Properties> },
    UserProperties(Properties),
    PageView { path: String, properties: Option<Properties> },
}

struct Registration {
    provider: Arc<dyn AnalyticsProvider>,
    status: ProviderStatus,
}

#[derive(Default)]
struct ManagerState {
    providers: Vec<Registration>,
    queue: VecDeque<PendingCall>,
    ready: bool,
    user_id: Option<String>,
    traits: Option<Properties>,
    user_properties: Properties,
}

impl ManagerState {
    fn active_providers(&self) -> Vec<Arc<dyn AnalyticsProvider>> {
        self.providers
            .iter()
            .filter(|reg| !matches!(reg.status, ProviderStatus::Disabled | ProviderStatus::Failed))
            .map(|reg| Arc::clone(&reg.provider))
            .collect()
    }

    fn all_initialized(&self) -> bool {
        self.providers
            .iter()
            .filter(|reg| reg.status != ProviderStatus::Disabled)
            .all(|reg| reg.status == ProviderStatus::Initialized)
    }
}

/// Single point of fan-out to every registered analytics provider.
///
/// Providers are delivered to in registration order. Shared state is only
/// locked to snapshot the provider list or touch the queue; provider calls
/// run without the lock held, so a provider may call back into the manager.
pub struct AnalyticsManager {
    state: Mutex<ManagerState>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsManager {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a manager that stamps events with the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { state: Mutex::new(ManagerState::default()), clock }
    }

    /// Register a provider.
    ///
    /// Duplicate names are allowed. A provider added after the manager is
    /// ready does not see previously replayed calls; it receives the stored
    /// identity and user properties right away, then future calls. If its
    /// initialization later fails it stops receiving calls until a retried
    /// [`AnalyticsManager::initialize`] succeeds for it.
    pub fn add_provider(&self, provider: Arc<dyn AnalyticsProvider>) {
        let (ready, identity, user_properties) = {
            let mut state = self.state.lock();
            state.providers.push(Registration {
                provider: Arc::clone(&provider),
                status: ProviderStatus::Pending,
            });
            let identity = state.user_id.clone().map(|id| (id, state.traits.clone()));
            (state.ready, identity, state.user_properties.clone())
        };

        info!(provider = provider.name(), ready, "analytics_provider_added");
        if !ready {
            return;
        }

        if let Some((user_id, traits)) = identity {
            isolate(provider.name(), Channel::Identify, || {
                provider.identify(&user_id, traits.as_ref())
            });
        }
        if !user_properties.is_empty() {
            isolate(provider.name(), Channel::UserProperties, || {
                provider.set_user_properties(&user_properties)
            });
        }
    }

    /// Initialize every pending or previously failed provider concurrently.
    ///
    /// Returns `true` once every non-disabled provider is initialized; the
    /// queued calls are then replayed in arrival order. Provider failures
    /// are logged and reported through the return value, never propagated.
    pub async fn initialize(&self) -> bool {
        let targets: Vec<(usize, Arc<dyn AnalyticsProvider>)> = {
            let state = self.state.lock();
            state
                .providers
                .iter()
                .enumerate()
                .filter(|(_, reg)| {
                    matches!(reg.status, ProviderStatus::Pending | ProviderStatus::Failed)
                })
                .map(|(idx, reg)| (idx, Arc::clone(&reg.provider)))
                .collect()
        };

        let outcomes =
            join_all(targets.iter().map(|(_, provider)| initialize_provider(Arc::clone(provider))))
                .await;

        let (all_initialized, already_ready, pending) = {
            let mut state = self.state.lock();
            for ((idx, _), initialized) in targets.iter().zip(outcomes) {
                if let Some(reg) = state.providers.get_mut(*idx) {
                    if reg.status != ProviderStatus::Disabled {
                        reg.status = if initialized {
                            ProviderStatus::Initialized
                        } else {
                            ProviderStatus::Failed
                        };
                    }
                }
            }
            (state.all_initialized(), state.ready, state.queue.len())
        };

        if already_ready {
            if !all_initialized {
                warn!("late analytics provider failed to initialize; manager stays ready");
            }
            return true;
        }

        if !all_initialized {
            warn!(pending, "analytics_manager_not_ready");
            return false;
        }

        let replayed = self.replay_queue();
        info!(providers = targets.len(), replayed, "analytics_manager_ready");
        true
    }

    /// Track an event, defaulting its priority and timestamp.
    pub fn track_event(&self, event: TrackingEvent) {
        let event = event.with_defaults(self.clock.utc_now());
        self.dispatch(PendingCall::Event(event));
    }

    /// Identify the current user; remembered for providers added later.
    pub fn identify(&self, user_id: impl Into<String>, traits: Option<Properties>) {
        let user_id = user_id.into();
        {
            let mut state = self.state.lock();
            state.user_id = Some(user_id.clone());
            state.traits = traits.clone();
        }
        self.dispatch(PendingCall::Identify { user_id, traits });
    }

    /// Merge into the stored user properties and send the merged set.
    pub fn set_user_properties(&self, properties: Properties) {
        let merged = {
            let mut state = self.state.lock();
            state.user_properties.extend(properties);
            state.user_properties.clone()
        };
        self.dispatch(PendingCall::UserProperties(merged));
    }

    pub fn page_view(&self, path: impl Into<String>, properties: Option<Properties>) {
        self.dispatch(PendingCall::PageView { path: path.into(), properties });
    }

    /// Mark every provider with the given name as disabled.
    ///
    /// Disabled providers receive no further calls and no longer count
    /// toward readiness. Returns the number of providers affected.
    pub fn disable_provider(&self, name: &str) -> usize {
        let mut state = self.state.lock();
        let mut disabled = 0;
        for reg in state.providers.iter_mut().filter(|reg| reg.provider.name() == name) {
            reg.status = ProviderStatus::Disabled;
            disabled += 1;
        }
        if disabled > 0 {
            info!(provider = name, disabled, "analytics_provider_disabled");
        }
        disabled
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    /// Number of calls waiting for readiness
    pub fn pending_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn provider_statuses(&self) -> Vec<(String, ProviderStatus)> {
        self.state
            .lock()
            .providers
            .iter()
            .map(|reg| (reg.provider.name().to_string(), reg.status))
            .collect()
    }

    pub fn user_id(&self) -> Option<String> {
        self.state.lock().user_id.clone()
    }

    pub fn user_properties(&self) -> Properties {
        self.state.lock().user_properties.clone()
    }

    fn dispatch(&self, call: PendingCall) {
        let providers = {
            let mut state = self.state.lock();
            if !state.ready {
                state.queue.push_back(call);
                debug!(pending = state.queue.len(), "analytics_call_queued");
                return;
            }
            state.active_providers()
        };
        deliver(&providers, &call);
    }

    /// Drain the queue while still "not ready", so calls arriving during the
    /// replay are queued behind it and FIFO order holds.
    fn replay_queue(&self) -> usize {
        let mut replayed = 0;
        loop {
            let (batch, providers): (Vec<PendingCall>, _) = {
                let mut state = self.state.lock();
                if state.queue.is_empty() {
                    state.ready = true;
                    break;
                }
                (state.queue.drain(..).collect(), state.active_providers())
            };
            for call in &batch {
                deliver(&providers, call);
            }
            replayed += batch.len();
        }
        replayed
    }
}

impl Default for AnalyticsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnalyticsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AnalyticsManager")
            .field("providers", &state.providers.len())
            .field("ready", &state.ready)
            .field("pending", &state.queue.len())
            .finish()
    }
}

async fn initialize_provider(provider: Arc<dyn AnalyticsProvider>) -> bool {
    let name = provider.name().to_string();
    match AssertUnwindSafe(provider.initialize()).catch_unwind().await {
        Ok(Ok(true)) => {
            debug!(provider = %name, "analytics_provider_initialized");
            true
        }
        Ok(Ok(false)) => {
            warn!(provider = %name, "analytics_provider_declined_initialization");
            false
        }
        Ok(Err(err)) => {
            error!(
                provider = %name,
                channel = %Channel::Initialize,
                error = %err,
                "analytics_provider_call_failed"
            );
            false
        }
        Err(_) => {
            error!(provider = %name, channel = %Channel::Initialize, "analytics_provider_call_panicked");
            false
        }
    }
}

fn deliver(providers: &[Arc<dyn AnalyticsProvider>], call: &PendingCall) {
    match call {
        PendingCall::Event(event) => {
            for provider in providers {
                isolate(provider.name(), Channel::Event, || provider.track_event(event));
            }
        }
        PendingCall::Identify { user_id, traits } => {
            for provider in providers {
                isolate(provider.name(), Channel::Identify, || {
                    provider.identify(user_id, traits.as_ref())
                });
            }
        }
        PendingCall::UserProperties(properties) => {
            for provider in providers {
                isolate(provider.name(), Channel::UserProperties, || {
                    provider.set_user_properties(properties)
                });
            }
        }
        PendingCall::PageView { path, properties } => {
            for provider in providers {
                isolate(provider.name(), Channel::PageView, || {
                    provider.page_view(path, properties.as_ref())
                });
            }
        }
    }
}

/// Run one provider call, containing both error results and panics.
fn isolate<F>(provider: &str, channel: Channel, call: F) -> bool
where
    F: FnOnce() -> ProviderResult<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            error!(provider, channel = %channel, error = %err, "analytics_provider_call_failed");
            false
        }
        Err(_) => {
            error!(provider, channel = %channel, "analytics_provider_call_panicked");
            false
        }
    }
}
