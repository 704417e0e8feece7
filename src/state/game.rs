//! Game snapshot model as pushed by the host, plus the round and status enums.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque identifier of a game session as stored by the remote database.
pub type GameId = String;
/// Opaque identifier of a clue.
pub type ClueId = String;
/// Opaque identifier of a player.
pub type PlayerId = String;

/// Lifecycle status of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Players are joining; nothing is on the board yet.
    Lobby,
    /// The board for the current round is being introduced.
    GameIntro,
    /// Categories are revealed one after the other.
    IntroducingCategories,
    /// Detour between two rounds.
    RoundTransition,
    /// Clues are being played.
    InProgress,
    /// The game reached its natural end.
    Completed,
    /// The host aborted the game.
    Cancelled,
}

impl GameStatus {
    /// Whether no further gameplay can happen in this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Completed | GameStatus::Cancelled)
    }

    /// Wire name of the status, as stored by the remote database.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Lobby => "lobby",
            GameStatus::GameIntro => "game_intro",
            GameStatus::IntroducingCategories => "introducing_categories",
            GameStatus::RoundTransition => "round_transition",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round of a game. Rounds only ever move forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RoundType {
    /// Opening round.
    Jeopardy,
    /// Double Jeopardy, values doubled.
    Double,
    /// Final Jeopardy, a single wagered clue.
    Final,
}

impl RoundType {
    /// Round that follows this one, `None` once the final round is reached.
    pub fn next(self) -> Option<RoundType> {
        match self {
            RoundType::Jeopardy => Some(RoundType::Double),
            RoundType::Double => Some(RoundType::Final),
            RoundType::Final => None,
        }
    }

    /// Round preceding this one, `None` for the opening round.
    pub fn previous(self) -> Option<RoundType> {
        match self {
            RoundType::Jeopardy => None,
            RoundType::Double => Some(RoundType::Jeopardy),
            RoundType::Final => Some(RoundType::Double),
        }
    }

    /// Wire name of the round.
    pub fn as_str(self) -> &'static str {
        match self {
            RoundType::Jeopardy => "jeopardy",
            RoundType::Double => "double",
            RoundType::Final => "final",
        }
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full snapshot of a game session as pushed by the remote state source.
///
/// Snapshots are never diffs: every push carries every field, which is what
/// lets the orchestrator infer transitions by comparing two consecutive values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GameSnapshot {
    /// Session identifier.
    pub id: GameId,
    /// Current lifecycle status.
    pub status: GameStatus,
    /// Round being played, absent before the game is configured.
    #[serde(default)]
    pub current_round: Option<RoundType>,
    /// Number of categories introduced so far in the current round.
    #[serde(default)]
    pub current_introduction_category: u32,
    /// Clue currently highlighted by the host.
    #[serde(default)]
    pub focused_clue_id: Option<ClueId>,
    /// Player currently allowed to answer.
    #[serde(default)]
    pub focused_player_id: Option<PlayerId>,
    /// Whether buzzers are currently rejected.
    #[serde(default = "locked")]
    pub is_buzzer_locked: bool,
}

fn locked() -> bool {
    true
}

impl GameSnapshot {
    /// Build a lobby snapshot with every optional field cleared.
    pub fn new(id: impl Into<GameId>, status: GameStatus) -> Self {
        Self {
            id: id.into(),
            status,
            current_round: None,
            current_introduction_category: 0,
            focused_clue_id: None,
            focused_player_id: None,
            is_buzzer_locked: true,
        }
    }

    /// Builder helper setting the current round.
    pub fn with_round(mut self, round: RoundType) -> Self {
        self.current_round = Some(round);
        self
    }

    /// Builder helper setting the introduction counter.
    pub fn with_category(mut self, category: u32) -> Self {
        self.current_introduction_category = category;
        self
    }

    /// Builder helper setting the focused clue.
    pub fn with_focused_clue(mut self, clue_id: impl Into<ClueId>) -> Self {
        self.focused_clue_id = Some(clue_id.into());
        self
    }

    /// Builder helper setting the focused player.
    pub fn with_focused_player(mut self, player_id: impl Into<PlayerId>) -> Self {
        self.focused_player_id = Some(player_id.into());
        self
    }

    /// Builder helper setting the buzzer lock.
    pub fn with_buzzer_locked(mut self, locked: bool) -> Self {
        self.is_buzzer_locked = locked;
        self
    }

    /// Buzzers may only be unlocked while a clue is revealed and nobody is answering.
    pub fn buzzer_gate_consistent(&self) -> bool {
        self.is_buzzer_locked
            || (self.focused_clue_id.is_some() && self.focused_player_id.is_none())
    }

    /// Whether `next` moves the round forward by exactly one step (or keeps it).
    pub fn round_advance_allowed(&self, next: Option<RoundType>) -> bool {
        match (self.current_round, next) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(current), Some(next)) => next == current || current.next() == Some(next),
        }
    }
}
