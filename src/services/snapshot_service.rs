use tracing::{info, warn};

use crate::{
    dto::{
        catch_up::RecentIntentResponse,
        snapshot::{IngestResponse, SnapshotRequest},
        validation::validate_identifier,
    },
    error::ServiceError,
    state::{
        SharedState,
        game::{GameId, GameSnapshot, GameStatus},
        intent::{Intent, IntentKind},
    },
};

/// Feed a pushed snapshot to the orchestrator and report the intents it published.
pub async fn ingest_snapshot(
    state: &SharedState,
    game_id: GameId,
    request: SnapshotRequest,
) -> Result<IngestResponse, ServiceError> {
    validate_identifier(&game_id)
        .map_err(|err| ServiceError::InvalidInput(format!("game id `{game_id}`: {err}")))?;
    let snapshot = request.into_snapshot(game_id);
    if !snapshot.buzzer_gate_consistent() {
        return Err(ServiceError::InvalidInput(
            "buzzer can only be unlocked on a focused clue with no player answering".into(),
        ));
    }

    if let Some(previous) = state.orchestrator().last_known(&snapshot.id).await {
        // Snapshots stay authoritative; an odd round jump is only reported.
        if !previous.round_advance_allowed(snapshot.current_round) {
            warn!(
                game_id = %snapshot.id,
                from = ?previous.current_round,
                to = ?snapshot.current_round,
                "round moved by more than one step"
            );
        }
    }
    if snapshot.status.is_terminal() {
        info!(game_id = %snapshot.id, status = %snapshot.status, "game reached a terminal status");
    }

    let game_id = snapshot.id.clone();
    let intents = state.orchestrator().ingest(snapshot).await;
    Ok(IngestResponse::now(game_id, intents))
}

/// Last snapshot ingested for a game.
pub async fn last_snapshot(state: &SharedState, game_id: &str) -> Result<GameSnapshot, ServiceError> {
    state
        .orchestrator()
        .last_known(game_id)
        .await
        .ok_or_else(|| ServiceError::NotFound(format!("game {game_id} has no snapshot")))
}

/// Forget a game: its last snapshot and every animation the display played for it.
pub fn clear_game(state: &SharedState, game_id: &str) -> Result<usize, ServiceError> {
    if !state.orchestrator().clear(game_id) {
        return Err(ServiceError::NotFound(format!("game {game_id} is not tracked")));
    }
    let forgotten = state.runtime().forget_game(game_id);
    info!(game_id, forgotten, "game session cleared");
    Ok(forgotten)
}

/// Announce that the wager is locked and the daily double clue text can be shown.
pub async fn reveal_daily_double_clue(
    state: &SharedState,
    game_id: &str,
    clue_id: &str,
) -> Result<Intent, ServiceError> {
    let snapshot = last_snapshot(state, game_id).await?;
    if snapshot.status != GameStatus::InProgress {
        return Err(ServiceError::InvalidState(format!(
            "game {game_id} is {}, not in progress",
            snapshot.status
        )));
    }
    if snapshot.focused_clue_id.as_deref() != Some(clue_id) {
        return Err(ServiceError::InvalidState(format!(
            "clue {clue_id} is not the focused clue of game {game_id}"
        )));
    }
    Ok(state
        .orchestrator()
        .announce_daily_double_clue(game_id, clue_id))
}

/// Whether an intent of `kind` was published for the game within the freshness window.
pub fn recent_intent(
    state: &SharedState,
    game_id: &str,
    kind: &str,
) -> Result<RecentIntentResponse, ServiceError> {
    let kind: IntentKind = kind.parse()?;
    let recent = state.bus().recent(kind, game_id);
    Ok(RecentIntentResponse {
        game_id: game_id.to_string(),
        kind,
        recently_published: recent.is_some(),
        age_ms: recent.as_ref().map(|recent| recent.age.as_millis() as u64),
        intent: recent.map(|recent| recent.intent),
    })
}
