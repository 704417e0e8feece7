use axum::{Json, Router, extract::State, routing::post};

use crate::{dto::stage::PlaybackResponse, services::playback_service, state::SharedState};

/// Playback control of every animation running on the shared display.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/animations/pause", post(pause))
        .route("/animations/resume", post(resume))
        .route("/animations/stop", post(stop))
}

/// Hold every running animation.
#[utoipa::path(
    post,
    path = "/animations/pause",
    tag = "display",
    responses((status = 200, description = "Animations paused", body = PlaybackResponse))
)]
pub async fn pause(State(state): State<SharedState>) -> Json<PlaybackResponse> {
    Json(playback_service::pause(&state))
}

/// Resume every paused animation.
#[utoipa::path(
    post,
    path = "/animations/resume",
    tag = "display",
    responses((status = 200, description = "Animations resumed", body = PlaybackResponse))
)]
pub async fn resume(State(state): State<SharedState>) -> Json<PlaybackResponse> {
    Json(playback_service::resume(&state))
}

/// Abort every running animation; their keys become playable again.
#[utoipa::path(
    post,
    path = "/animations/stop",
    tag = "display",
    responses((status = 200, description = "Animations stopped", body = PlaybackResponse))
)]
pub async fn stop(State(state): State<SharedState>) -> Json<PlaybackResponse> {
    Json(playback_service::stop(&state))
}
