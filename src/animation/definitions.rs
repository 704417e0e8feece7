//! One definition per intent kind: the effect itself, the predicate telling
//! whether its trigger is already in the past, and how to rebuild its
//! parameters from a snapshot.

use futures::{FutureExt, future::BoxFuture};

use crate::{
    animation::{AnimationContext, AnimationError, AnimationRuntime, ExecuteConfig, TargetState},
    state::{
        game::{GameSnapshot, GameStatus, RoundType},
        intent::{Intent, IntentKind},
    },
};

/// Behaviour shared by every animation the display can play.
pub trait AnimationDefinition: Send + Sync {
    /// Intent kind this definition animates.
    fn kind(&self) -> IntentKind;

    /// Play the effect for `params`.
    ///
    /// With [`ExecuteConfig::instant`] the transition is skipped and the end
    /// state is written right away.
    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>>;

    /// Whether `state` shows the trigger for `params` already happened.
    fn already_happened(&self, state: &GameSnapshot, params: Option<&Intent>) -> bool;

    /// Rebuild the parameters of this animation from a snapshot alone.
    fn params_from_state(&self, state: &GameSnapshot) -> Option<Intent>;

    /// Whether a late observer should fast-forward to this animation's end state.
    ///
    /// Without `params` the key is rebuilt from `state`; when that is not
    /// possible there is nothing to fast-forward.
    fn should_run_instantly(
        &self,
        state: &GameSnapshot,
        params: Option<&Intent>,
        runtime: &AnimationRuntime,
    ) -> bool {
        let key = match params {
            Some(params) => {
                if params.kind() != self.kind() || params.game_id() != state.id {
                    return false;
                }
                params.animation_key()
            }
            None => match self.params_from_state(state) {
                Some(rebuilt) => rebuilt.animation_key(),
                None => return false,
            },
        };
        runtime.is_idle(&key) && self.already_happened(state, params)
    }
}

/// Wait for `target`, play the transition unless instant, then write the end state.
async fn reveal_target(
    ctx: &AnimationContext,
    target: String,
    config: ExecuteConfig,
    apply: impl FnOnce(&mut TargetState),
) -> Result<(), AnimationError> {
    ctx.stage.wait_for_target(&target).await?;
    if !config.instant {
        ctx.control.hold(ctx.duration).await?;
    }
    ctx.control.checkpoint().await?;
    ctx.stage.update(&target, apply)
}

fn mismatch(definition: IntentKind, params: &Intent) -> AnimationError {
    AnimationError::ParamsMismatch {
        definition,
        got: params.kind(),
    }
}

fn in_progress(state: &GameSnapshot) -> bool {
    state.status == GameStatus::InProgress
}

/// Board appearing at the start of a round.
pub struct BoardIntro;

impl AnimationDefinition for BoardIntro {
    fn kind(&self) -> IntentKind {
        IntentKind::BoardIntro
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>> {
        async move {
            let Intent::BoardIntro { round, .. } = params else {
                return Err(mismatch(self.kind(), params));
            };
            reveal_target(ctx, "board".to_string(), config, |target| {
                target.visible = true;
                target.label = Some(round.to_string());
            })
            .await
        }
        .boxed()
    }

    fn already_happened(&self, state: &GameSnapshot, _params: Option<&Intent>) -> bool {
        matches!(
            state.status,
            GameStatus::GameIntro | GameStatus::IntroducingCategories | GameStatus::InProgress
        )
    }

    fn params_from_state(&self, state: &GameSnapshot) -> Option<Intent> {
        state.current_round.map(|round| Intent::BoardIntro {
            game_id: state.id.clone(),
            round,
        })
    }
}

/// Category header revealed during the introduction sequence.
pub struct CategoryIntro;

impl AnimationDefinition for CategoryIntro {
    fn kind(&self) -> IntentKind {
        IntentKind::CategoryIntro
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>> {
        async move {
            let Intent::CategoryIntro {
                category_number, ..
            } = params
            else {
                return Err(mismatch(self.kind(), params));
            };
            reveal_target(
                ctx,
                format!("category-{category_number}"),
                config,
                |target| target.visible = true,
            )
            .await
        }
        .boxed()
    }

    fn already_happened(&self, state: &GameSnapshot, _params: Option<&Intent>) -> bool {
        matches!(
            state.status,
            GameStatus::IntroducingCategories | GameStatus::InProgress
        )
    }

    fn params_from_state(&self, state: &GameSnapshot) -> Option<Intent> {
        (state.current_introduction_category > 0).then(|| Intent::CategoryIntro {
            game_id: state.id.clone(),
            round: state.current_round,
            category_number: state.current_introduction_category,
        })
    }
}

/// Regular clue zooming out of the board.
pub struct ClueReveal;

impl AnimationDefinition for ClueReveal {
    fn kind(&self) -> IntentKind {
        IntentKind::ClueReveal
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>> {
        async move {
            let Intent::ClueReveal { clue_id, .. } = params else {
                return Err(mismatch(self.kind(), params));
            };
            reveal_target(ctx, format!("clue-{clue_id}"), config, |target| {
                target.visible = true;
                target.highlighted = true;
            })
            .await
        }
        .boxed()
    }

    fn already_happened(&self, state: &GameSnapshot, _params: Option<&Intent>) -> bool {
        in_progress(state) && state.focused_clue_id.is_some()
    }

    fn params_from_state(&self, state: &GameSnapshot) -> Option<Intent> {
        state
            .focused_clue_id
            .as_ref()
            .map(|clue_id| Intent::ClueReveal {
                game_id: state.id.clone(),
                clue_id: clue_id.clone(),
            })
    }
}

/// Both daily double definitions only catch up on the clue currently focused.
fn daily_double_focused(state: &GameSnapshot, params: Option<&Intent>) -> bool {
    let clue_id = match params {
        Some(Intent::DailyDoubleReveal { clue_id, .. })
        | Some(Intent::DailyDoubleClueReveal { clue_id, .. }) => clue_id,
        _ => return false,
    };
    in_progress(state) && state.focused_clue_id.as_deref() == Some(clue_id.as_str())
}

/// "Daily double" splash shown before the wager.
pub struct DailyDoubleReveal;

impl AnimationDefinition for DailyDoubleReveal {
    fn kind(&self) -> IntentKind {
        IntentKind::DailyDoubleReveal
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>> {
        async move {
            let Intent::DailyDoubleReveal { clue_id, .. } = params else {
                return Err(mismatch(self.kind(), params));
            };
            reveal_target(ctx, format!("daily-double-{clue_id}"), config, |target| {
                target.visible = true;
                target.highlighted = true;
                target.label = Some("Daily Double".to_string());
            })
            .await
        }
        .boxed()
    }

    fn already_happened(&self, state: &GameSnapshot, params: Option<&Intent>) -> bool {
        daily_double_focused(state, params)
    }

    // Whether the focused clue is a daily double is not part of the snapshot.
    fn params_from_state(&self, _state: &GameSnapshot) -> Option<Intent> {
        None
    }
}

/// Daily double clue text, shown once the wager is locked in.
pub struct DailyDoubleClueReveal;

impl AnimationDefinition for DailyDoubleClueReveal {
    fn kind(&self) -> IntentKind {
        IntentKind::DailyDoubleClueReveal
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>> {
        async move {
            let Intent::DailyDoubleClueReveal { clue_id, .. } = params else {
                return Err(mismatch(self.kind(), params));
            };
            reveal_target(ctx, format!("clue-{clue_id}"), config, |target| {
                target.visible = true;
                target.highlighted = true;
            })
            .await?;
            // The splash is no longer relevant once the clue text is up.
            if ctx.stage.is_mounted(&format!("daily-double-{clue_id}")) {
                ctx.stage
                    .update(&format!("daily-double-{clue_id}"), |target| {
                        target.visible = false;
                    })?;
            }
            Ok(())
        }
        .boxed()
    }

    fn already_happened(&self, state: &GameSnapshot, params: Option<&Intent>) -> bool {
        daily_double_focused(state, params)
    }

    fn params_from_state(&self, _state: &GameSnapshot) -> Option<Intent> {
        None
    }
}

/// Banner announcing the next round.
///
/// Never fast-forwarded: a late observer simply lands on the new round's board.
pub struct RoundTransition;

impl AnimationDefinition for RoundTransition {
    fn kind(&self) -> IntentKind {
        IntentKind::RoundTransition
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>> {
        async move {
            let Intent::RoundTransition { to_round, .. } = params else {
                return Err(mismatch(self.kind(), params));
            };
            reveal_target(ctx, "round-banner".to_string(), config, |target| {
                target.visible = true;
                target.label = Some(to_round.to_string());
            })
            .await
        }
        .boxed()
    }

    fn already_happened(&self, _state: &GameSnapshot, _params: Option<&Intent>) -> bool {
        false
    }

    fn params_from_state(&self, state: &GameSnapshot) -> Option<Intent> {
        let to_round = state.current_round?;
        let from_round: RoundType = to_round.previous()?;
        Some(Intent::RoundTransition {
            game_id: state.id.clone(),
            from_round,
            to_round,
        })
    }

    fn should_run_instantly(
        &self,
        _state: &GameSnapshot,
        _params: Option<&Intent>,
        _runtime: &AnimationRuntime,
    ) -> bool {
        false
    }
}

/// Podium of the player who won the buzzer race lights up.
pub struct PlayerBuzzIn;

impl AnimationDefinition for PlayerBuzzIn {
    fn kind(&self) -> IntentKind {
        IntentKind::PlayerBuzzIn
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a AnimationContext,
        params: &'a Intent,
        config: ExecuteConfig,
    ) -> BoxFuture<'a, Result<(), AnimationError>> {
        async move {
            let Intent::PlayerBuzzIn { player_id, .. } = params else {
                return Err(mismatch(self.kind(), params));
            };
            reveal_target(ctx, format!("player-{player_id}"), config, |target| {
                target.highlighted = true;
            })
            .await
        }
        .boxed()
    }

    fn already_happened(&self, state: &GameSnapshot, _params: Option<&Intent>) -> bool {
        in_progress(state) && state.focused_player_id.is_some()
    }

    fn params_from_state(&self, state: &GameSnapshot) -> Option<Intent> {
        state
            .focused_player_id
            .as_ref()
            .map(|player_id| Intent::PlayerBuzzIn {
                game_id: state.id.clone(),
                clue_id: state.focused_clue_id.clone(),
                player_id: player_id.clone(),
            })
    }
}
