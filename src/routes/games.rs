use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        catch_up::{CatchUpResponse, CatchUpRunResponse, RecentIntentResponse},
        snapshot::{IngestResponse, SnapshotRequest},
    },
    error::AppError,
    services::{catch_up_service, snapshot_service},
    state::{SharedState, game::GameSnapshot, intent::Intent},
};

/// Routes fed by the remote state source and queried by late observers.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}", get(get_snapshot).delete(clear_game))
        .route("/games/{id}/snapshot", post(ingest_snapshot))
        .route("/games/{id}/catch-up", get(catch_up))
        .route("/games/{id}/catch-up/run", post(run_catch_up))
        .route("/games/{id}/intents/{kind}/recent", get(recent_intent))
        .route(
            "/games/{id}/daily-double/{clue}/reveal",
            post(reveal_daily_double_clue),
        )
}

/// Ingest a full snapshot of a game and publish the intents it implies.
#[utoipa::path(
    post,
    path = "/games/{id}/snapshot",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game")),
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "Snapshot ingested", body = IngestResponse),
        (status = 400, description = "Invalid snapshot")
    )
)]
pub async fn ingest_snapshot(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<SnapshotRequest>>,
) -> Result<Json<IngestResponse>, AppError> {
    let response = snapshot_service::ingest_snapshot(&state, id, payload).await?;
    Ok(Json(response))
}

/// Last snapshot ingested for a game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Last known snapshot", body = GameSnapshot),
        (status = 404, description = "No snapshot ingested for this game")
    )
)]
pub async fn get_snapshot(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, AppError> {
    Ok(Json(snapshot_service::last_snapshot(&state, &id).await?))
}

/// Forget a game session and the animations the display played for it.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 204, description = "Game cleared"),
        (status = 404, description = "Game not tracked")
    )
)]
pub async fn clear_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    snapshot_service::clear_game(&state, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Animations a freshly mounted observer must fast-forward.
#[utoipa::path(
    get,
    path = "/games/{id}/catch-up",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Catch-up list", body = CatchUpResponse),
        (status = 404, description = "No snapshot ingested for this game")
    )
)]
pub async fn catch_up(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CatchUpResponse>, AppError> {
    Ok(Json(catch_up_service::catch_up_list(&state, &id).await?))
}

/// Fast-forward the shared display to the latest snapshot.
#[utoipa::path(
    post,
    path = "/games/{id}/catch-up/run",
    tag = "display",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Catch-up executed", body = CatchUpRunResponse),
        (status = 404, description = "No snapshot ingested for this game")
    )
)]
pub async fn run_catch_up(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CatchUpRunResponse>, AppError> {
    Ok(Json(catch_up_service::run_catch_up(&state, &id).await?))
}

/// Whether an intent of a kind was published for the game within the freshness window.
#[utoipa::path(
    get,
    path = "/games/{id}/intents/{kind}/recent",
    tag = "games",
    params(
        ("id" = String, Path, description = "Identifier of the game"),
        ("kind" = String, Path, description = "Intent kind, e.g. `ClueReveal` or `clue_reveal`")
    ),
    responses(
        (status = 200, description = "Recent intent lookup", body = RecentIntentResponse),
        (status = 400, description = "Unknown intent kind")
    )
)]
pub async fn recent_intent(
    State(state): State<SharedState>,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<RecentIntentResponse>, AppError> {
    Ok(Json(snapshot_service::recent_intent(&state, &id, &kind)?))
}

/// Reveal the daily double clue text once the wager is locked in.
#[utoipa::path(
    post,
    path = "/games/{id}/daily-double/{clue}/reveal",
    tag = "games",
    params(
        ("id" = String, Path, description = "Identifier of the game"),
        ("clue" = String, Path, description = "Focused daily double clue")
    ),
    responses(
        (status = 200, description = "Intent published", body = Intent),
        (status = 404, description = "No snapshot ingested for this game"),
        (status = 409, description = "Clue is not focused or game not in progress")
    )
)]
pub async fn reveal_daily_double_clue(
    State(state): State<SharedState>,
    Path((id, clue)): Path<(String, String)>,
) -> Result<Json<Intent>, AppError> {
    Ok(Json(
        snapshot_service::reveal_daily_double_clue(&state, &id, &clue).await?,
    ))
}
