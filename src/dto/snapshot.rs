//! Payloads exchanged when the remote state source pushes a game snapshot.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_identifier},
    state::{
        game::{GameId, GameSnapshot, GameStatus, RoundType},
        intent::Intent,
    },
};

/// Full snapshot of a game as stored by the remote database.
///
/// The game identifier comes from the path; every other field is carried on
/// each push.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    /// Lifecycle status of the game.
    pub status: GameStatus,
    /// Round being played, absent before the first board.
    #[serde(default)]
    pub current_round: Option<RoundType>,
    /// One-based index of the category being introduced, `0` before the sequence starts.
    #[serde(default)]
    pub current_introduction_category: u32,
    /// Clue currently open on the board.
    #[serde(default)]
    #[validate(custom(function = "validate_identifier"))]
    pub focused_clue_id: Option<String>,
    /// Player who won the buzzer race on the open clue.
    #[serde(default)]
    #[validate(custom(function = "validate_identifier"))]
    pub focused_player_id: Option<String>,
    /// Buzzer gate; omitted means locked.
    #[serde(default = "locked")]
    pub is_buzzer_locked: bool,
}

fn locked() -> bool {
    true
}

impl SnapshotRequest {
    /// Attach the path identifier and build the domain snapshot.
    pub fn into_snapshot(self, game_id: GameId) -> GameSnapshot {
        GameSnapshot {
            id: game_id,
            status: self.status,
            current_round: self.current_round,
            current_introduction_category: self.current_introduction_category,
            focused_clue_id: self.focused_clue_id,
            focused_player_id: self.focused_player_id,
            is_buzzer_locked: self.is_buzzer_locked,
        }
    }
}

/// Intents inferred from one snapshot, in publication order.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    /// Game the snapshot was pushed for.
    pub game_id: GameId,
    /// Published intents, in check order.
    pub intents: Vec<Intent>,
    /// RFC 3339 timestamp of the ingest.
    pub received_at: String,
}

impl IngestResponse {
    /// Stamp the published intents with the current time.
    pub fn now(game_id: GameId, intents: Vec<Intent>) -> Self {
        Self {
            game_id,
            intents,
            received_at: format_system_time(SystemTime::now()),
        }
    }
}
