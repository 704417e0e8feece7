use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::{
    animation::{ExecuteConfig, RunOutcome},
    state::{
        AppState, SharedState,
        event_bus::{SubscriberError, Subscription},
    },
};

/// Play every published intent on the shared display, animated.
///
/// Each intent runs in its own task so the publisher never waits on an
/// animation. Failures are logged by the runtime and stay on the display side.
pub fn spawn_auto_player(state: &SharedState) -> Subscription {
    let weak: Weak<AppState> = Arc::downgrade(state);
    state.bus().subscribe(move |intent| {
        let handle = Handle::try_current()
            .map_err(|err| SubscriberError::new(format!("no runtime to play on: {err}")))?;
        let weak = weak.clone();
        let intent = intent.clone();
        handle.spawn(async move {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match state
                .runtime()
                .play(
                    state.registry(),
                    state.stage(),
                    &intent,
                    ExecuteConfig::animated(),
                )
                .await
            {
                Ok(RunOutcome::Completed) => {
                    debug!(key = %intent.animation_key(), "auto-played animation")
                }
                Ok(RunOutcome::Skipped) => {}
                Err(err) => {
                    warn!(key = %intent.animation_key(), error = %err, "auto-play failed")
                }
            }
        });
        Ok(())
    })
}
