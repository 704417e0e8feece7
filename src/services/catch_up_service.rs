use std::time::Duration;

use tracing::{info, warn};

use crate::{
    animation::{AnimationRuntime, ExecuteConfig, RunOutcome},
    dto::catch_up::{CatchUpResponse, CatchUpRunResponse},
    error::ServiceError,
    services::snapshot_service::last_snapshot,
    state::SharedState,
};

/// Animations an observer mounting now would have to fast-forward.
///
/// Evaluated against an empty runtime since a fresh observer has played nothing.
pub async fn catch_up_list(
    state: &SharedState,
    game_id: &str,
) -> Result<CatchUpResponse, ServiceError> {
    let snapshot = last_snapshot(state, game_id).await?;
    let fresh = AnimationRuntime::new(Duration::ZERO);
    let intents = state
        .registry()
        .check_all_for_instant_run(&snapshot, &fresh)
        .into_iter()
        .map(|run| run.params)
        .collect();

    Ok(CatchUpResponse {
        game_id: snapshot.id,
        status: snapshot.status,
        intents,
    })
}

/// Fast-forward the shared display to the latest snapshot of a game.
///
/// Entries whose target never mounts are logged and skipped; the others keep running.
pub async fn run_catch_up(
    state: &SharedState,
    game_id: &str,
) -> Result<CatchUpRunResponse, ServiceError> {
    let snapshot = last_snapshot(state, game_id).await?;
    let runtime = state.runtime();
    let mut executed = Vec::new();
    let mut skipped = Vec::new();

    for run in state.registry().check_all_for_instant_run(&snapshot, runtime) {
        let outcome = runtime
            .play(
                state.registry(),
                state.stage(),
                &run.params,
                ExecuteConfig::instant(),
            )
            .await;

        match outcome {
            Ok(RunOutcome::Completed) => executed.push(run.params),
            Ok(RunOutcome::Skipped) => skipped.push(run.params),
            Err(err) => {
                warn!(game_id, kind = %run.params.kind(), error = %err, "catch-up entry skipped");
                skipped.push(run.params);
            }
        }
    }

    info!(
        game_id,
        executed = executed.len(),
        skipped = skipped.len(),
        "display caught up"
    );
    Ok(CatchUpRunResponse {
        game_id: snapshot.id,
        executed,
        skipped,
    })
}
