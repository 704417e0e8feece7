//! Animation bookkeeping: which effect belongs to which intent, whether it
//! already ran, and how to fast-forward observers that attach late.

pub mod definitions;
pub mod registry;
pub mod runtime;
pub mod stage;

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::state::intent::IntentKind;

pub use self::registry::{AnimationRegistry, InstantRun};
pub use self::runtime::{AnimationRuntime, PlaybackControl, PlaybackState, RunOutcome};
pub use self::stage::{Stage, TargetState};

/// Errors raised while executing a single animation.
///
/// None of them is fatal for the game: the remote state stays the source of
/// truth and callers log and skip the failed animation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// The presentation target never mounted.
    #[error("target `{target}` not mounted after {waited:?}")]
    TargetMissing {
        /// Name of the missing target.
        target: String,
        /// How long the animation waited for it.
        waited: Duration,
    },
    /// The animation was stopped while running.
    #[error("animation stopped")]
    Stopped,
    /// The definition was handed parameters of another intent kind.
    #[error("{definition} animation cannot run with {got} parameters")]
    ParamsMismatch {
        /// Kind the definition animates.
        definition: IntentKind,
        /// Kind of the parameters it received.
        got: IntentKind,
    },
}

/// Options passed to [`definitions::AnimationDefinition::execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteConfig {
    /// Jump straight to the end state without the transition.
    pub instant: bool,
}

impl ExecuteConfig {
    /// Animated execution.
    pub fn animated() -> Self {
        Self { instant: false }
    }

    /// Instant execution used to catch up with past events.
    pub fn instant() -> Self {
        Self { instant: true }
    }
}

/// Everything an effect needs while running.
#[derive(Clone)]
pub struct AnimationContext {
    /// Presentation targets the effect draws on.
    pub stage: Arc<Stage>,
    /// Pause/stop signal of this particular run.
    pub control: PlaybackControl,
    /// Length of the animated transition.
    pub duration: Duration,
}
