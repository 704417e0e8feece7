//! Run-once bookkeeping for animations and the playback signal of each live run.

use std::{future::Future, sync::Arc, time::Duration};

use dashmap::{DashMap, DashSet};
use tokio::{
    sync::watch,
    time::{Instant, sleep},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    animation::{
        AnimationContext, AnimationError, ExecuteConfig, registry::AnimationRegistry, stage::Stage,
    },
    state::intent::Intent,
};

/// Playback signal shared between the runtime and a running effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// The effect may progress.
    Running,
    /// The effect must hold until resumed or stopped.
    Paused,
    /// The effect must abort as soon as possible.
    Stopped,
}

/// Effect-side view of a run's playback signal.
#[derive(Debug, Clone)]
pub struct PlaybackControl {
    receiver: watch::Receiver<PlaybackState>,
}

impl PlaybackControl {
    /// Control that is never paused nor stopped.
    pub fn detached() -> Self {
        let (_sender, receiver) = watch::channel(PlaybackState::Running);
        Self { receiver }
    }

    /// Return once playback may continue, holding while paused.
    pub async fn checkpoint(&self) -> Result<(), AnimationError> {
        let mut receiver = self.receiver.clone();
        wait_until_running(&mut receiver).await
    }

    /// Let `duration` of running time elapse. Paused time does not count.
    pub async fn hold(&self, duration: Duration) -> Result<(), AnimationError> {
        // One receiver marks each value seen, so a signal sent after the
        // state check still wakes the select below.
        let mut receiver = self.receiver.clone();
        let mut remaining = duration;
        loop {
            wait_until_running(&mut receiver).await?;
            if remaining.is_zero() {
                return Ok(());
            }
            let started = Instant::now();
            tokio::select! {
                _ = sleep(remaining) => remaining = Duration::ZERO,
                changed = receiver.changed() => {
                    remaining = remaining.saturating_sub(started.elapsed());
                    if changed.is_err() {
                        sleep(remaining).await;
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn wait_until_running(
    receiver: &mut watch::Receiver<PlaybackState>,
) -> Result<(), AnimationError> {
    loop {
        let state = *receiver.borrow_and_update();
        match state {
            PlaybackState::Running => return Ok(()),
            PlaybackState::Stopped => return Err(AnimationError::Stopped),
            PlaybackState::Paused => {
                if receiver.changed().await.is_err() {
                    // Runtime side is gone; nothing can resume or stop us anymore.
                    return Ok(());
                }
            }
        }
    }
}

/// Result of asking the runtime to play an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The effect ran to completion.
    Completed,
    /// The key was already playing or played; nothing ran.
    Skipped,
}

struct ActiveAnimation {
    key: String,
    control: watch::Sender<PlaybackState>,
}

/// Tracks which animations are playing or already played, and every live run.
///
/// Keys are `type:gameId:entityId` (see [`Intent::animation_key`]).
pub struct AnimationRuntime {
    playing: DashSet<String>,
    played: DashSet<String>,
    active: DashMap<Uuid, ActiveAnimation>,
    duration: Duration,
}

impl AnimationRuntime {
    /// Create a runtime whose animated effects last `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            playing: DashSet::new(),
            played: DashSet::new(),
            active: DashMap::new(),
            duration,
        }
    }

    /// Whether the animation for `key` is currently running.
    pub fn is_playing(&self, key: &str) -> bool {
        self.playing.contains(key)
    }

    /// Whether the animation for `key` already completed.
    pub fn has_played(&self, key: &str) -> bool {
        self.played.contains(key)
    }

    /// Neither playing nor played.
    pub fn is_idle(&self, key: &str) -> bool {
        !self.is_playing(key) && !self.has_played(key)
    }

    /// Run `effect` for `key` unless it is already playing or played.
    ///
    /// The key is marked playing before the effect starts so concurrent
    /// triggers are suppressed. Success marks it played; failure (or the run
    /// being dropped) clears it so a later attempt can retry.
    pub async fn run<F, Fut>(&self, key: String, effect: F) -> Result<RunOutcome, AnimationError>
    where
        F: FnOnce(PlaybackControl) -> Fut,
        Fut: Future<Output = Result<(), AnimationError>>,
    {
        if !self.playing.insert(key.clone()) {
            debug!(key = %key, "animation already playing; skipped");
            return Ok(RunOutcome::Skipped);
        }
        if self.played.contains(&key) {
            self.playing.remove(&key);
            debug!(key = %key, "animation already played; skipped");
            return Ok(RunOutcome::Skipped);
        }

        let (sender, receiver) = watch::channel(PlaybackState::Running);
        let id = Uuid::new_v4();
        self.active.insert(
            id,
            ActiveAnimation {
                key: key.clone(),
                control: sender,
            },
        );
        let guard = RunGuard {
            runtime: self,
            key: &key,
            id,
        };

        let result = effect(PlaybackControl { receiver }).await;
        if result.is_ok() {
            // Marked played before the playing mark is released.
            self.played.insert(key.clone());
        }
        drop(guard);

        match result {
            Ok(()) => Ok(RunOutcome::Completed),
            Err(err) => {
                warn!(key = %key, error = %err, "animation failed; key cleared for retry");
                Err(err)
            }
        }
    }

    /// Play the registered animation for `intent`.
    pub async fn play(
        &self,
        registry: &AnimationRegistry,
        stage: &Arc<Stage>,
        intent: &Intent,
        config: ExecuteConfig,
    ) -> Result<RunOutcome, AnimationError> {
        let definition = registry.get(intent.kind());
        let duration = self.duration;
        self.run(intent.animation_key(), |control| async move {
            let ctx = AnimationContext {
                stage: Arc::clone(stage),
                control,
                duration,
            };
            definition.execute(&ctx, intent, config).await
        })
        .await
    }

    /// Forget every played key of a game, e.g. when its session ends.
    pub fn forget_game(&self, game_id: &str) -> usize {
        let before = self.played.len();
        self.played.retain(|key| !belongs_to(key, game_id));
        before - self.played.len()
    }

    /// Number of runs currently in flight.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Hold every running animation.
    pub fn pause_all(&self) -> usize {
        self.signal_all(PlaybackState::Paused)
    }

    /// Let every paused animation continue.
    pub fn resume_all(&self) -> usize {
        self.signal_all(PlaybackState::Running)
    }

    /// Abort every running animation; their keys are cleared.
    pub fn stop_all(&self) -> usize {
        self.signal_all(PlaybackState::Stopped)
    }

    fn signal_all(&self, state: PlaybackState) -> usize {
        let mut signalled = 0;
        for entry in self.active.iter() {
            let previous = entry.control.send_replace(state);
            if previous != PlaybackState::Stopped {
                signalled += 1;
            }
        }
        info!(?state, signalled, "animation playback signal sent");
        signalled
    }

    #[cfg(test)]
    fn active_keys(&self) -> Vec<String> {
        self.active.iter().map(|entry| entry.key.clone()).collect()
    }
}

fn belongs_to(key: &str, game_id: &str) -> bool {
    key.split(':').nth(1) == Some(game_id)
}

/// Releases the playing mark and the active handle even if the run is dropped mid-flight.
struct RunGuard<'a> {
    runtime: &'a AnimationRuntime,
    key: &'a str,
    id: Uuid,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.runtime.active.remove(&self.id);
        self.runtime.playing.remove(self.key);
    }
}
