use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Clue Board Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::intent_stream,
        crate::routes::games::ingest_snapshot,
        crate::routes::games::get_snapshot,
        crate::routes::games::clear_game,
        crate::routes::games::catch_up,
        crate::routes::games::run_catch_up,
        crate::routes::games::recent_intent,
        crate::routes::games::reveal_daily_double_clue,
        crate::routes::stage::list_targets,
        crate::routes::stage::mount_target,
        crate::routes::stage::unmount_target,
        crate::routes::animations::pause,
        crate::routes::animations::resume,
        crate::routes::animations::stop,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::snapshot::SnapshotRequest,
            crate::dto::snapshot::IngestResponse,
            crate::dto::catch_up::CatchUpResponse,
            crate::dto::catch_up::CatchUpRunResponse,
            crate::dto::catch_up::RecentIntentResponse,
            crate::dto::stage::TargetView,
            crate::dto::stage::TargetChangeResponse,
            crate::dto::stage::PlaybackResponse,
            crate::state::game::GameSnapshot,
            crate::state::game::GameStatus,
            crate::state::game::RoundType,
            crate::state::intent::Intent,
            crate::state::intent::IntentKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "games", description = "Snapshot ingestion and per-game intents"),
        (name = "display", description = "Presentation targets and playback of the shared board"),
    )
)]
pub struct ApiDoc;
