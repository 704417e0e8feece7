use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness together with a few pipeline counters.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(
        state.orchestrator().tracked_sessions(),
        state.runtime().active_count(),
        state.bus().subscriber_count(),
    )
}
