use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::stage::{TargetChangeResponse, TargetView},
    error::AppError,
    services::playback_service,
    state::SharedState,
};

/// Routes the rendering layer uses to declare its presentation targets.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/stage/targets", get(list_targets))
        .route(
            "/stage/targets/{name}",
            put(mount_target).delete(unmount_target),
        )
}

/// List mounted presentation targets and their end state.
#[utoipa::path(
    get,
    path = "/stage/targets",
    tag = "display",
    responses((status = 200, description = "Mounted targets", body = [TargetView]))
)]
pub async fn list_targets(State(state): State<SharedState>) -> Json<Vec<TargetView>> {
    Json(playback_service::list_targets(&state))
}

/// Mount a presentation target so animations can draw on it.
#[utoipa::path(
    put,
    path = "/stage/targets/{name}",
    tag = "display",
    params(("name" = String, Path, description = "Target name, e.g. `board` or `clue-c1`")),
    responses((status = 200, description = "Target mounted", body = TargetChangeResponse))
)]
pub async fn mount_target(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Json<TargetChangeResponse> {
    Json(playback_service::mount_target(&state, name))
}

/// Unmount a presentation target.
#[utoipa::path(
    delete,
    path = "/stage/targets/{name}",
    tag = "display",
    params(("name" = String, Path, description = "Target name")),
    responses(
        (status = 200, description = "Target unmounted", body = TargetChangeResponse),
        (status = 404, description = "Target not mounted")
    )
)]
pub async fn unmount_target(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<TargetChangeResponse>, AppError> {
    Ok(Json(playback_service::unmount_target(&state, name)?))
}
