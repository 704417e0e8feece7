use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/intents",
    tag = "sse",
    responses((status = 200, description = "Intent SSE stream, one `intent.<kind>` event per published intent", content_type = "text/event-stream", body = String))
)]
/// Stream every published intent to connected displays.
pub async fn intent_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_public(&state);
    info!("New intent SSE connection");
    sse_service::to_sse_stream(receiver, sse_service::handshake_event())
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/intents", get(intent_stream))
}
