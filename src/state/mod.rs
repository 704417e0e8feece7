pub mod event_bus;
pub mod game;
pub mod intent;
pub mod orchestrator;
mod sse;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    animation::{AnimationRegistry, AnimationRuntime, Stage},
    config::AppConfig,
    dao::clue_lookup::DailyDoubleLookup,
    state::{
        event_bus::{IntentBus, Subscription},
        orchestrator::IntentOrchestrator,
    },
};

pub use self::sse::SseHub;

/// Handle to the application state shared by handlers and background tasks.
pub type SharedState = Arc<AppState>;

/// Central application state: the intent pipeline plus the shared board display.
pub struct AppState {
    config: AppConfig,
    bus: IntentBus,
    orchestrator: IntentOrchestrator,
    registry: AnimationRegistry,
    runtime: Arc<AnimationRuntime>,
    stage: Arc<Stage>,
    sse: SseHub,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, lookup: Arc<dyn DailyDoubleLookup>) -> SharedState {
        let bus = IntentBus::new(config.freshness_window, config.recent_cache_capacity);
        let orchestrator = IntentOrchestrator::new(bus.clone(), lookup, config.lookup_timeout);
        Arc::new(Self {
            orchestrator,
            registry: AnimationRegistry::new(),
            runtime: Arc::new(AnimationRuntime::new(config.animation_duration)),
            stage: Arc::new(Stage::new(
                config.target_poll_interval,
                config.target_wait_timeout,
            )),
            sse: SseHub::new(config.sse_channel_capacity),
            subscriptions: Mutex::new(Vec::new()),
            bus,
            config,
        })
    }

    /// Configuration the state was built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Bus carrying every inferred intent.
    pub fn bus(&self) -> &IntentBus {
        &self.bus
    }

    /// Snapshot diffing engine.
    pub fn orchestrator(&self) -> &IntentOrchestrator {
        &self.orchestrator
    }

    /// Animation definitions, one per intent kind.
    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    /// Runtime bookkeeping of the shared board display.
    pub fn runtime(&self) -> &Arc<AnimationRuntime> {
        &self.runtime
    }

    /// Presentation targets of the shared board display.
    pub fn stage(&self) -> &Arc<Stage> {
        &self.stage
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Keep a bus subscription alive for as long as the state lives.
    pub fn retain_subscription(&self, subscription: Subscription) {
        self.subscriptions.lock().push(subscription);
    }
}
