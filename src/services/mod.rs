/// Display-side player replaying every published intent.
pub mod auto_player;
/// Late-observer catch-up computation and execution.
pub mod catch_up_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Presentation targets and playback control of the shared display.
pub mod playback_service;
/// Snapshot ingestion and per-game session management.
pub mod snapshot_service;
/// Bridge from the intent bus to Server-Sent Events.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
