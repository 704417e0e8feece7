//! Closed catalog of the semantic events inferred from game-state deltas.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::game::{ClueId, GameId, PlayerId, RoundType};

/// Something that happened in a game, independent of how it is displayed.
///
/// Every variant carries the game identifier and the minimal payload needed to
/// replay the matching animation. Intents are built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum Intent {
    /// The board of a round is shown for the first time.
    #[serde(rename_all = "camelCase")]
    BoardIntro {
        /// Game the board belongs to.
        game_id: GameId,
        /// Round whose board is introduced.
        round: RoundType,
    },
    /// A category header is revealed during the introduction sequence.
    #[serde(rename_all = "camelCase")]
    CategoryIntro {
        /// Game the category belongs to.
        game_id: GameId,
        /// Round whose categories are being introduced, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        round: Option<RoundType>,
        /// One-based position of the category being introduced.
        category_number: u32,
    },
    /// A regular clue is opened.
    #[serde(rename_all = "camelCase")]
    ClueReveal {
        /// Game the clue belongs to.
        game_id: GameId,
        /// Opened clue.
        clue_id: ClueId,
    },
    /// A daily double splash is shown before the wager.
    #[serde(rename_all = "camelCase")]
    DailyDoubleReveal {
        /// Game the clue belongs to.
        game_id: GameId,
        /// Daily double clue.
        clue_id: ClueId,
    },
    /// The daily double clue text is revealed once the wager is locked in.
    #[serde(rename_all = "camelCase")]
    DailyDoubleClueReveal {
        /// Game the clue belongs to.
        game_id: GameId,
        /// Daily double clue.
        clue_id: ClueId,
    },
    /// The game moves from one round to the next.
    #[serde(rename_all = "camelCase")]
    RoundTransition {
        /// Game changing round.
        game_id: GameId,
        /// Round being left.
        from_round: RoundType,
        /// Round being entered.
        to_round: RoundType,
    },
    /// A player won the buzzer race.
    #[serde(rename_all = "camelCase")]
    PlayerBuzzIn {
        /// Game the player belongs to.
        game_id: GameId,
        /// Clue the player buzzed on, when one is focused.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clue_id: Option<ClueId>,
        /// Player allowed to answer.
        player_id: PlayerId,
    },
}

impl Intent {
    /// Discriminant of the intent.
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::BoardIntro { .. } => IntentKind::BoardIntro,
            Intent::CategoryIntro { .. } => IntentKind::CategoryIntro,
            Intent::ClueReveal { .. } => IntentKind::ClueReveal,
            Intent::DailyDoubleReveal { .. } => IntentKind::DailyDoubleReveal,
            Intent::DailyDoubleClueReveal { .. } => IntentKind::DailyDoubleClueReveal,
            Intent::RoundTransition { .. } => IntentKind::RoundTransition,
            Intent::PlayerBuzzIn { .. } => IntentKind::PlayerBuzzIn,
        }
    }

    /// Game the intent belongs to.
    pub fn game_id(&self) -> &str {
        match self {
            Intent::BoardIntro { game_id, .. }
            | Intent::CategoryIntro { game_id, .. }
            | Intent::ClueReveal { game_id, .. }
            | Intent::DailyDoubleReveal { game_id, .. }
            | Intent::DailyDoubleClueReveal { game_id, .. }
            | Intent::RoundTransition { game_id, .. }
            | Intent::PlayerBuzzIn { game_id, .. } => game_id,
        }
    }

    /// Identifier of the entity the intent is about.
    ///
    /// Category and buzz-in entities are scoped by their round and clue so the
    /// same number or player can animate again later in the game.
    pub fn entity_id(&self) -> String {
        match self {
            Intent::BoardIntro { round, .. } => round.to_string(),
            Intent::CategoryIntro {
                round: Some(round),
                category_number,
                ..
            } => format!("{round}/{category_number}"),
            Intent::CategoryIntro {
                round: None,
                category_number,
                ..
            } => category_number.to_string(),
            Intent::ClueReveal { clue_id, .. }
            | Intent::DailyDoubleReveal { clue_id, .. }
            | Intent::DailyDoubleClueReveal { clue_id, .. } => clue_id.clone(),
            Intent::RoundTransition {
                from_round,
                to_round,
                ..
            } => format!("{from_round}->{to_round}"),
            Intent::PlayerBuzzIn {
                clue_id: Some(clue_id),
                player_id,
                ..
            } => format!("{clue_id}/{player_id}"),
            Intent::PlayerBuzzIn {
                clue_id: None,
                player_id,
                ..
            } => player_id.clone(),
        }
    }

    /// Key under which the bus caches the most recent intent of this kind for the game.
    pub fn cache_key(&self) -> String {
        cache_key(self.kind(), self.game_id())
    }

    /// Key tracking whether the animation for this exact entity ran.
    pub fn animation_key(&self) -> String {
        format!("{}:{}:{}", self.kind(), self.game_id(), self.entity_id())
    }
}

/// Build the `type:gameId` key used by the recent-intent cache.
pub fn cache_key(kind: IntentKind, game_id: &str) -> String {
    format!("{kind}:{game_id}")
}

/// Fieldless discriminant of [`Intent`], usable as a dense table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum IntentKind {
    /// See [`Intent::BoardIntro`].
    BoardIntro,
    /// See [`Intent::CategoryIntro`].
    CategoryIntro,
    /// See [`Intent::ClueReveal`].
    ClueReveal,
    /// See [`Intent::DailyDoubleReveal`].
    DailyDoubleReveal,
    /// See [`Intent::DailyDoubleClueReveal`].
    DailyDoubleClueReveal,
    /// See [`Intent::RoundTransition`].
    RoundTransition,
    /// See [`Intent::PlayerBuzzIn`].
    PlayerBuzzIn,
}

impl IntentKind {
    /// Number of intent kinds.
    pub const COUNT: usize = 7;

    /// Every kind, ordered by [`IntentKind::index`].
    pub const ALL: [IntentKind; IntentKind::COUNT] = [
        IntentKind::BoardIntro,
        IntentKind::CategoryIntro,
        IntentKind::ClueReveal,
        IntentKind::DailyDoubleReveal,
        IntentKind::DailyDoubleClueReveal,
        IntentKind::RoundTransition,
        IntentKind::PlayerBuzzIn,
    ];

    /// Position of the kind inside [`IntentKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tag used in intent payloads and keys.
    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::BoardIntro => "BoardIntro",
            IntentKind::CategoryIntro => "CategoryIntro",
            IntentKind::ClueReveal => "ClueReveal",
            IntentKind::DailyDoubleReveal => "DailyDoubleReveal",
            IntentKind::DailyDoubleClueReveal => "DailyDoubleClueReveal",
            IntentKind::RoundTransition => "RoundTransition",
            IntentKind::PlayerBuzzIn => "PlayerBuzzIn",
        }
    }

    /// Snake-case name used for SSE event names and URL segments.
    pub fn snake_name(self) -> &'static str {
        match self {
            IntentKind::BoardIntro => "board_intro",
            IntentKind::CategoryIntro => "category_intro",
            IntentKind::ClueReveal => "clue_reveal",
            IntentKind::DailyDoubleReveal => "daily_double_reveal",
            IntentKind::DailyDoubleClueReveal => "daily_double_clue_reveal",
            IntentKind::RoundTransition => "round_transition",
            IntentKind::PlayerBuzzIn => "player_buzz_in",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known intent kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown intent kind `{0}`")]
pub struct UnknownIntentKind(pub String);

impl FromStr for IntentKind {
    type Err = UnknownIntentKind;

    /// Accepts both the tag (`BoardIntro`) and the snake-case name (`board_intro`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        IntentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value || kind.snake_name() == value)
            .ok_or_else(|| UnknownIntentKind(value.to_string()))
    }
}
