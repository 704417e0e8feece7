//! Presentation targets mounted by the display, and waiting for them to appear.

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::time::{Instant, sleep};
use tracing::debug;
use utoipa::ToSchema;

use crate::animation::AnimationError;

/// Visual end state of a presentation target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TargetState {
    /// Whether the target is shown.
    pub visible: bool,
    /// Whether the target is emphasised.
    pub highlighted: bool,
    /// Optional text rendered on the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Registry of presentation targets mounted by the rendering layer.
///
/// Effects never create targets: they wait for the rendering layer to mount
/// them and only then write their end state.
pub struct Stage {
    targets: DashMap<String, TargetState>,
    poll_interval: Duration,
    wait_timeout: Duration,
}

impl Stage {
    /// Create an empty stage polling every `poll_interval` for at most `wait_timeout`.
    pub fn new(poll_interval: Duration, wait_timeout: Duration) -> Self {
        Self {
            targets: DashMap::new(),
            poll_interval,
            wait_timeout,
        }
    }

    /// Mount a target, keeping its state if it is already mounted.
    ///
    /// Returns `true` when the target was not mounted before.
    pub fn mount(&self, name: impl Into<String>) -> bool {
        let mut inserted = false;
        self.targets.entry(name.into()).or_insert_with(|| {
            inserted = true;
            TargetState::default()
        });
        inserted
    }

    /// Unmount a target, returning whether it existed.
    pub fn unmount(&self, name: &str) -> bool {
        self.targets.remove(name).is_some()
    }

    /// Whether `name` is currently mounted.
    pub fn is_mounted(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Current state of a target.
    pub fn target(&self, name: &str) -> Option<TargetState> {
        self.targets.get(name).map(|entry| entry.value().clone())
    }

    /// Every mounted target, sorted by name.
    pub fn targets(&self) -> Vec<(String, TargetState)> {
        let mut targets: Vec<_> = self
            .targets
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        targets.sort_by(|a, b| a.0.cmp(&b.0));
        targets
    }

    /// Mutate a mounted target.
    pub fn update(
        &self,
        name: &str,
        apply: impl FnOnce(&mut TargetState),
    ) -> Result<(), AnimationError> {
        let mut entry = self
            .targets
            .get_mut(name)
            .ok_or_else(|| AnimationError::TargetMissing {
                target: name.to_string(),
                waited: Duration::ZERO,
            })?;
        apply(entry.value_mut());
        Ok(())
    }

    /// Wait until `name` is mounted, failing once the configured timeout elapses.
    pub async fn wait_for_target(&self, name: &str) -> Result<(), AnimationError> {
        let started = Instant::now();
        let deadline = started + self.wait_timeout;
        loop {
            if self.is_mounted(name) {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                debug!(target_name = name, "gave up waiting for target");
                return Err(AnimationError::TargetMissing {
                    target: name.to_string(),
                    waited: now - started,
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
