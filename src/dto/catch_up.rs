use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    game::{GameId, GameStatus},
    intent::{Intent, IntentKind},
};

/// Animations a late observer has to fast-forward, in registry order.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatchUpResponse {
    /// Game the list was computed for.
    pub game_id: GameId,
    /// Status of the snapshot the list was computed from.
    pub status: GameStatus,
    /// Parameters of each animation to fast-forward.
    pub intents: Vec<Intent>,
}

/// Result of running the catch-up list on the shared display.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatchUpRunResponse {
    /// Game whose animations were run.
    pub game_id: GameId,
    /// Intents whose end state was written.
    pub executed: Vec<Intent>,
    /// Intents skipped because their target never mounted or playback stopped.
    pub skipped: Vec<Intent>,
}

/// Whether an intent of one kind was published recently for a game.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentIntentResponse {
    /// Game that was asked about.
    pub game_id: GameId,
    /// Intent kind that was asked about.
    pub kind: IntentKind,
    /// Whether the cache still holds a fresh intent.
    pub recently_published: bool,
    /// The cached intent, while fresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Age of the cached intent in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_ms: Option<u64>,
}
