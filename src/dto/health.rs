use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always "ok" once the router answers.
    pub status: String,
    /// Number of game sessions the orchestrator currently tracks.
    pub tracked_games: usize,
    /// Number of animations running on the display.
    pub active_animations: usize,
    /// Number of live intent subscribers (SSE bridge and auto-player included).
    pub intent_subscribers: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(tracked_games: usize, active_animations: usize, intent_subscribers: usize) -> Self {
        Self {
            status: "ok".to_string(),
            tracked_games,
            active_animations,
            intent_subscribers,
        }
    }
}
