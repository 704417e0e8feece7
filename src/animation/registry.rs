//! Fixed table mapping each intent kind to its animation definition.

use tracing::debug;

use crate::{
    animation::{
        AnimationRuntime,
        definitions::{
            AnimationDefinition, BoardIntro, CategoryIntro, ClueReveal, DailyDoubleClueReveal,
            DailyDoubleReveal, PlayerBuzzIn, RoundTransition,
        },
    },
    state::{
        game::GameSnapshot,
        intent::{Intent, IntentKind},
    },
};

/// A definition that should jump to its end state, with the parameters to do so.
pub struct InstantRun<'a> {
    /// Definition to execute.
    pub definition: &'a dyn AnimationDefinition,
    /// Parameters rebuilt from the snapshot.
    pub params: Intent,
}

/// Static table of animation definitions, one per [`IntentKind`].
pub struct AnimationRegistry {
    definitions: [Box<dyn AnimationDefinition>; IntentKind::COUNT],
}

impl AnimationRegistry {
    /// Build the table; slot `i` holds the definition of `IntentKind::ALL[i]`.
    pub fn new() -> Self {
        Self {
            definitions: [
                Box::new(BoardIntro),
                Box::new(CategoryIntro),
                Box::new(ClueReveal),
                Box::new(DailyDoubleReveal),
                Box::new(DailyDoubleClueReveal),
                Box::new(RoundTransition),
                Box::new(PlayerBuzzIn),
            ],
        }
    }

    /// Definition animating `kind`.
    pub fn get(&self, kind: IntentKind) -> &dyn AnimationDefinition {
        self.definitions[kind.index()].as_ref()
    }

    /// Every definition, in catalog order.
    pub fn definitions(&self) -> impl Iterator<Item = &dyn AnimationDefinition> {
        self.definitions.iter().map(|definition| definition.as_ref())
    }

    /// Definitions whose trigger `state` shows in the past and whose
    /// parameters can be rebuilt from `state` alone.
    pub fn check_all_for_instant_run(
        &self,
        state: &GameSnapshot,
        runtime: &AnimationRuntime,
    ) -> Vec<InstantRun<'_>> {
        let runs: Vec<_> = self
            .definitions()
            .filter_map(|definition| {
                let params = definition.params_from_state(state)?;
                definition
                    .should_run_instantly(state, Some(&params), runtime)
                    .then_some(InstantRun { definition, params })
            })
            .collect();
        debug!(
            game_id = %state.id,
            status = %state.status,
            instant_runs = runs.len(),
            "checked animations for instant run"
        );
        runs
    }
}

impl Default for AnimationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::game::{GameStatus, RoundType};

    fn kinds(runs: &[InstantRun<'_>]) -> Vec<IntentKind> {
        runs.iter().map(|run| run.definition.kind()).collect()
    }

    #[test]
    fn slots_follow_catalog_order() {
        let registry = AnimationRegistry::new();
        for kind in IntentKind::ALL {
            assert_eq!(registry.get(kind).kind(), kind);
        }
        assert_eq!(registry.definitions().count(), IntentKind::COUNT);
    }

    #[test]
    fn mid_clue_observer_catches_up_board_category_clue_and_player() {
        let registry = AnimationRegistry::new();
        let runtime = AnimationRuntime::new(Duration::ZERO);
        let state = GameSnapshot::new("g1", GameStatus::InProgress)
            .with_round(RoundType::Double)
            .with_category(6)
            .with_focused_clue("c4")
            .with_focused_player("p2")
            .with_buzzer_locked(true);

        let runs = registry.check_all_for_instant_run(&state, &runtime);

        assert_eq!(
            kinds(&runs),
            vec![
                IntentKind::BoardIntro,
                IntentKind::CategoryIntro,
                IntentKind::ClueReveal,
                IntentKind::PlayerBuzzIn,
            ]
        );
        assert_eq!(
            runs[2].params,
            Intent::ClueReveal {
                game_id: "g1".into(),
                clue_id: "c4".into(),
            }
        );
    }

    #[test]
    fn lobby_has_nothing_to_catch_up() {
        let registry = AnimationRegistry::new();
        let runtime = AnimationRuntime::new(Duration::ZERO);
        let state = GameSnapshot::new("g1", GameStatus::Lobby).with_round(RoundType::Jeopardy);

        assert!(registry.check_all_for_instant_run(&state, &runtime).is_empty());
    }

    #[tokio::test]
    async fn already_played_animations_are_excluded() {
        let registry = AnimationRegistry::new();
        let runtime = AnimationRuntime::new(Duration::ZERO);
        let state = GameSnapshot::new("g1", GameStatus::GameIntro).with_round(RoundType::Jeopardy);
        runtime
            .run("BoardIntro:g1:jeopardy".into(), |_| async { Ok(()) })
            .await
            .unwrap();

        assert!(registry.check_all_for_instant_run(&state, &runtime).is_empty());
    }
}
