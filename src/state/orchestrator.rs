//! Turns full game snapshots into semantic intents, once per meaningful change.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::{sync::Mutex, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    dao::clue_lookup::{DailyDoubleLookup, LookupError},
    state::{
        event_bus::IntentBus,
        game::{ClueId, GameId, GameSnapshot, GameStatus},
        intent::Intent,
    },
};

type SessionSlot = Arc<Mutex<Option<GameSnapshot>>>;

/// Diffs consecutive snapshots of each game and publishes the inferred intents.
///
/// Each game owns its own slot lock so ingests for one game are serialised
/// (including across the daily double lookup) while games progress independently.
pub struct IntentOrchestrator {
    sessions: DashMap<GameId, SessionSlot>,
    bus: IntentBus,
    lookup: Arc<dyn DailyDoubleLookup>,
    lookup_timeout: Duration,
}

impl IntentOrchestrator {
    /// Create an orchestrator publishing on `bus` and resolving daily doubles through `lookup`.
    pub fn new(
        bus: IntentBus,
        lookup: Arc<dyn DailyDoubleLookup>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            bus,
            lookup,
            lookup_timeout,
        }
    }

    /// Compare `next` with the last known snapshot of its game, publish every
    /// intent it implies, then remember it.
    ///
    /// Checks run in a fixed order and are independent: one snapshot may
    /// publish several intents. The published intents are also returned.
    pub async fn ingest(&self, next: GameSnapshot) -> Vec<Intent> {
        let slot = self.session_slot(&next.id);
        let mut last_known = slot.lock().await;
        let previous = last_known.as_ref();
        let mut published = Vec::new();

        if let Some(intent) = round_transition(previous, &next) {
            self.emit(intent, &mut published);
        }
        if let Some(intent) = board_intro(previous, &next) {
            self.emit(intent, &mut published);
        }
        if let Some(intent) = category_intro(previous, &next) {
            self.emit(intent, &mut published);
        }
        if let Some(clue_id) = newly_focused_clue(previous, &next) {
            let intent = self.reveal_intent(&next.id, clue_id).await;
            self.emit(intent, &mut published);
        }
        if let Some(intent) = player_buzz_in(previous, &next) {
            self.emit(intent, &mut published);
        }

        debug!(
            game_id = %next.id,
            status = %next.status,
            published = published.len(),
            "snapshot ingested"
        );
        *last_known = Some(next);
        published
    }

    /// Publish the daily double clue reveal once the wager has been placed.
    ///
    /// This moment is not visible in the snapshot fields, so the host triggers it explicitly.
    pub fn announce_daily_double_clue(
        &self,
        game_id: impl Into<GameId>,
        clue_id: impl Into<ClueId>,
    ) -> Intent {
        let intent = Intent::DailyDoubleClueReveal {
            game_id: game_id.into(),
            clue_id: clue_id.into(),
        };
        let mut published = Vec::with_capacity(1);
        self.emit(intent.clone(), &mut published);
        intent
    }

    /// Forget the last known snapshot of a game so a later session starts from scratch.
    pub fn clear(&self, game_id: &str) -> bool {
        let removed = self.sessions.remove(game_id).is_some();
        if removed {
            info!(game_id, "cleared orchestrator state");
        }
        removed
    }

    /// Last snapshot ingested for `game_id`.
    pub async fn last_known(&self, game_id: &str) -> Option<GameSnapshot> {
        let slot = self.sessions.get(game_id).map(|entry| Arc::clone(entry.value()))?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Number of games with a stored snapshot slot.
    pub fn tracked_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn session_slot(&self, game_id: &str) -> SessionSlot {
        if let Some(slot) = self.sessions.get(game_id) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.sessions.entry(game_id.to_string()).or_default().value())
    }

    fn emit(&self, intent: Intent, published: &mut Vec<Intent>) {
        info!(kind = %intent.kind(), game_id = intent.game_id(), entity = %intent.entity_id(), "intent inferred");
        self.bus.publish(intent.clone());
        published.push(intent);
    }

    /// Decide between a daily double and a plain reveal. Lookup failures fall
    /// back to the plain reveal so something is always shown.
    async fn reveal_intent(&self, game_id: &str, clue_id: ClueId) -> Intent {
        let outcome = match timeout(self.lookup_timeout, self.lookup.is_daily_double(&clue_id)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout),
        };

        match outcome {
            Ok(true) => Intent::DailyDoubleReveal {
                game_id: game_id.to_string(),
                clue_id,
            },
            Ok(false) => Intent::ClueReveal {
                game_id: game_id.to_string(),
                clue_id,
            },
            Err(err) => {
                warn!(
                    game_id,
                    clue_id = %clue_id,
                    error = %err,
                    "daily double lookup failed; falling back to clue reveal"
                );
                Intent::ClueReveal {
                    game_id: game_id.to_string(),
                    clue_id,
                }
            }
        }
    }
}

/// Round changed while the status is exactly `round_transition`.
fn round_transition(previous: Option<&GameSnapshot>, next: &GameSnapshot) -> Option<Intent> {
    let from_round = previous?.current_round?;
    let to_round = next.current_round?;
    if from_round == to_round || next.status != GameStatus::RoundTransition {
        return None;
    }
    Some(Intent::RoundTransition {
        game_id: next.id.clone(),
        from_round,
        to_round,
    })
}

/// Status entered `game_intro` with a known round.
fn board_intro(previous: Option<&GameSnapshot>, next: &GameSnapshot) -> Option<Intent> {
    let entered = next.status == GameStatus::GameIntro
        && previous.map(|snapshot| snapshot.status) != Some(GameStatus::GameIntro);
    if !entered {
        return None;
    }
    Some(Intent::BoardIntro {
        game_id: next.id.clone(),
        round: next.current_round?,
    })
}

/// Introduction counter strictly increased while introducing categories.
fn category_intro(previous: Option<&GameSnapshot>, next: &GameSnapshot) -> Option<Intent> {
    let before = previous.map_or(0, |snapshot| snapshot.current_introduction_category);
    let now = next.current_introduction_category;
    if next.status != GameStatus::IntroducingCategories || now == 0 || now <= before {
        return None;
    }
    Some(Intent::CategoryIntro {
        game_id: next.id.clone(),
        round: next.current_round,
        category_number: now,
    })
}

fn newly_focused_clue(previous: Option<&GameSnapshot>, next: &GameSnapshot) -> Option<ClueId> {
    let clue_id = next.focused_clue_id.as_ref()?;
    let before = previous.and_then(|snapshot| snapshot.focused_clue_id.as_ref());
    (before != Some(clue_id)).then(|| clue_id.clone())
}

fn player_buzz_in(previous: Option<&GameSnapshot>, next: &GameSnapshot) -> Option<Intent> {
    let player_id = next.focused_player_id.as_ref()?;
    let before = previous.and_then(|snapshot| snapshot.focused_player_id.as_ref());
    if before == Some(player_id) {
        return None;
    }
    Some(Intent::PlayerBuzzIn {
        game_id: next.id.clone(),
        clue_id: next.focused_clue_id.clone(),
        player_id: player_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use futures::{FutureExt, future::BoxFuture};
    use parking_lot::Mutex as SyncMutex;

    use super::*;
    use crate::{
        dao::clue_lookup::{LookupResult, memory::InMemoryClueLookup},
        state::{event_bus::Subscription, game::RoundType},
    };

    struct FailingLookup;

    impl DailyDoubleLookup for FailingLookup {
        fn is_daily_double(&self, _clue_id: &str) -> BoxFuture<'static, LookupResult<bool>> {
            async {
                Err(LookupError::unavailable(
                    "database offline".into(),
                    std::io::Error::other("connection refused"),
                ))
            }
            .boxed()
        }
    }

    struct SlowLookup;

    impl DailyDoubleLookup for SlowLookup {
        fn is_daily_double(&self, _clue_id: &str) -> BoxFuture<'static, LookupResult<bool>> {
            async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(true)
            }
            .boxed()
        }
    }

    struct Harness {
        orchestrator: IntentOrchestrator,
        received: Arc<SyncMutex<Vec<Intent>>>,
        _subscription: Subscription,
    }

    impl Harness {
        fn with_lookup(lookup: Arc<dyn DailyDoubleLookup>) -> Self {
            let bus = IntentBus::new(Duration::from_secs(2), 64);
            let received = Arc::new(SyncMutex::new(Vec::new()));
            let subscription = {
                let received = Arc::clone(&received);
                bus.subscribe(move |intent| {
                    received.lock().push(intent.clone());
                    Ok(())
                })
            };
            Self {
                orchestrator: IntentOrchestrator::new(bus, lookup, Duration::from_secs(2)),
                received,
                _subscription: subscription,
            }
        }

        fn new() -> Self {
            Self::with_lookup(Arc::new(InMemoryClueLookup::new(["dd1".to_string()])))
        }

        fn received(&self) -> Vec<Intent> {
            self.received.lock().clone()
        }
    }

    fn snapshot(status: GameStatus) -> GameSnapshot {
        GameSnapshot::new("g1", status).with_round(RoundType::Jeopardy)
    }

    #[tokio::test]
    async fn entering_game_intro_publishes_board_intro() {
        let harness = Harness::new();
        assert!(harness.orchestrator.ingest(snapshot(GameStatus::Lobby)).await.is_empty());
        harness.orchestrator.ingest(snapshot(GameStatus::GameIntro)).await;

        assert_eq!(
            harness.received(),
            vec![Intent::BoardIntro {
                game_id: "g1".into(),
                round: RoundType::Jeopardy,
            }]
        );
    }

    #[tokio::test]
    async fn board_intro_is_published_once_per_entry() {
        let harness = Harness::new();
        for status in [
            GameStatus::Lobby,
            GameStatus::GameIntro,
            GameStatus::GameIntro,
            GameStatus::GameIntro,
            GameStatus::IntroducingCategories,
            GameStatus::InProgress,
        ] {
            harness.orchestrator.ingest(snapshot(status)).await;
        }

        let board_intros = harness
            .received()
            .into_iter()
            .filter(|intent| matches!(intent, Intent::BoardIntro { .. }))
            .count();
        assert_eq!(board_intros, 1);
    }

    #[tokio::test]
    async fn board_intro_requires_a_round() {
        let harness = Harness::new();
        harness
            .orchestrator
            .ingest(GameSnapshot::new("g1", GameStatus::GameIntro))
            .await;
        assert!(harness.received().is_empty());
    }

    #[tokio::test]
    async fn round_change_without_transition_status_is_ignored() {
        let harness = Harness::new();
        harness.orchestrator.ingest(snapshot(GameStatus::InProgress)).await;
        let published = harness
            .orchestrator
            .ingest(GameSnapshot::new("g1", GameStatus::InProgress).with_round(RoundType::Double))
            .await;
        assert!(published.is_empty());
    }

    #[tokio::test]
    async fn round_change_in_transition_status_publishes_once() {
        let harness = Harness::new();
        harness.orchestrator.ingest(snapshot(GameStatus::InProgress)).await;
        let transition =
            GameSnapshot::new("g1", GameStatus::RoundTransition).with_round(RoundType::Double);
        harness.orchestrator.ingest(transition.clone()).await;
        harness.orchestrator.ingest(transition).await;

        assert_eq!(
            harness.received(),
            vec![Intent::RoundTransition {
                game_id: "g1".into(),
                from_round: RoundType::Jeopardy,
                to_round: RoundType::Double,
            }]
        );
    }

    #[tokio::test]
    async fn category_counter_increments_publish_individually() {
        let harness = Harness::new();
        let intro = |n| snapshot(GameStatus::IntroducingCategories).with_category(n);

        assert!(harness.orchestrator.ingest(intro(0)).await.is_empty());
        for n in [1, 2, 3, 3] {
            harness.orchestrator.ingest(intro(n)).await;
        }

        let numbers: Vec<u32> = harness
            .received()
            .into_iter()
            .map(|intent| match intent {
                Intent::CategoryIntro {
                    category_number, ..
                } => category_number,
                other => panic!("unexpected intent {other:?}"),
            })
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn category_counter_outside_introduction_is_ignored() {
        let harness = Harness::new();
        harness
            .orchestrator
            .ingest(snapshot(GameStatus::InProgress).with_category(4))
            .await;
        assert!(harness.received().is_empty());
    }

    #[tokio::test]
    async fn focused_clue_publishes_reveal_or_daily_double() {
        let harness = Harness::new();
        harness.orchestrator.ingest(snapshot(GameStatus::InProgress)).await;
        harness
            .orchestrator
            .ingest(snapshot(GameStatus::InProgress).with_focused_clue("c1"))
            .await;
        harness
            .orchestrator
            .ingest(snapshot(GameStatus::InProgress).with_focused_clue("dd1"))
            .await;

        assert_eq!(
            harness.received(),
            vec![
                Intent::ClueReveal {
                    game_id: "g1".into(),
                    clue_id: "c1".into(),
                },
                Intent::DailyDoubleReveal {
                    game_id: "g1".into(),
                    clue_id: "dd1".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_clue_reveal() {
        let harness = Harness::with_lookup(Arc::new(FailingLookup));
        let published = harness
            .orchestrator
            .ingest(snapshot(GameStatus::InProgress).with_focused_clue("dd1"))
            .await;

        assert_eq!(
            published,
            vec![Intent::ClueReveal {
                game_id: "g1".into(),
                clue_id: "dd1".into(),
            }]
        );
        let stored = harness.orchestrator.last_known("g1").await.unwrap();
        assert_eq!(stored.focused_clue_id.as_deref(), Some("dd1"));
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_timeout_falls_back_to_clue_reveal() {
        let harness = Harness::with_lookup(Arc::new(SlowLookup));
        let published = harness
            .orchestrator
            .ingest(snapshot(GameStatus::InProgress).with_focused_clue("dd1"))
            .await;
        assert!(matches!(published.as_slice(), [Intent::ClueReveal { .. }]));
    }

    #[tokio::test]
    async fn buzz_in_publishes_once_per_player() {
        let harness = Harness::new();
        let focused = snapshot(GameStatus::InProgress).with_focused_clue("c1");
        harness.orchestrator.ingest(focused.clone()).await;
        harness
            .orchestrator
            .ingest(focused.clone().with_focused_player("p1"))
            .await;
        harness
            .orchestrator
            .ingest(focused.clone().with_focused_player("p1"))
            .await;
        // Incorrect answer: player released, clue stays up for a re-buzz.
        harness.orchestrator.ingest(focused.clone()).await;
        harness
            .orchestrator
            .ingest(focused.with_focused_player("p2"))
            .await;

        let players: Vec<String> = harness
            .received()
            .into_iter()
            .filter_map(|intent| match intent {
                Intent::PlayerBuzzIn { player_id, .. } => Some(player_id),
                _ => None,
            })
            .collect();
        assert_eq!(players, vec!["p1".to_string(), "p2".to_string()]);
    }

    #[tokio::test]
    async fn same_player_on_a_new_clue_gets_its_own_buzz_in() {
        let harness = Harness::new();
        let on_clue = |clue: &str| snapshot(GameStatus::InProgress).with_focused_clue(clue);
        harness.orchestrator.ingest(on_clue("c1").with_focused_player("p1")).await;
        harness.orchestrator.ingest(on_clue("c1")).await;
        harness.orchestrator.ingest(on_clue("c2")).await;
        harness.orchestrator.ingest(on_clue("c2").with_focused_player("p1")).await;

        let buzz_ins: Vec<Intent> = harness
            .received()
            .into_iter()
            .filter(|intent| matches!(intent, Intent::PlayerBuzzIn { .. }))
            .collect();
        assert_eq!(buzz_ins.len(), 2);
        assert_ne!(buzz_ins[0].animation_key(), buzz_ins[1].animation_key());
        assert_eq!(
            buzz_ins[1],
            Intent::PlayerBuzzIn {
                game_id: "g1".into(),
                clue_id: Some("c2".into()),
                player_id: "p1".into(),
            }
        );
    }

    #[tokio::test]
    async fn category_intros_carry_their_round() {
        let harness = Harness::new();
        let intro = |round: RoundType| {
            GameSnapshot::new("g1", GameStatus::IntroducingCategories)
                .with_round(round)
                .with_category(1)
        };
        harness.orchestrator.ingest(intro(RoundType::Jeopardy)).await;
        harness
            .orchestrator
            .ingest(GameSnapshot::new("g1", GameStatus::RoundTransition).with_round(RoundType::Double))
            .await;
        harness.orchestrator.ingest(intro(RoundType::Double)).await;

        let keys: Vec<String> = harness
            .received()
            .iter()
            .filter(|intent| matches!(intent, Intent::CategoryIntro { .. }))
            .map(Intent::animation_key)
            .collect();
        assert_eq!(
            keys,
            vec![
                "CategoryIntro:g1:jeopardy/1".to_string(),
                "CategoryIntro:g1:double/1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn one_snapshot_can_publish_several_intents_in_check_order() {
        let harness = Harness::new();
        harness.orchestrator.ingest(snapshot(GameStatus::InProgress)).await;
        let published = harness
            .orchestrator
            .ingest(
                GameSnapshot::new("g1", GameStatus::RoundTransition)
                    .with_round(RoundType::Double)
                    .with_focused_clue("c9")
                    .with_focused_player("p1"),
            )
            .await;

        let kinds: Vec<_> = published.iter().map(Intent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::state::intent::IntentKind::RoundTransition,
                crate::state::intent::IntentKind::ClueReveal,
                crate::state::intent::IntentKind::PlayerBuzzIn,
            ]
        );
        assert_eq!(harness.received(), published);
    }

    #[tokio::test]
    async fn clear_forgets_previous_snapshot() {
        let harness = Harness::new();
        harness.orchestrator.ingest(snapshot(GameStatus::GameIntro)).await;
        assert_eq!(harness.orchestrator.tracked_sessions(), 1);

        assert!(harness.orchestrator.clear("g1"));
        assert!(!harness.orchestrator.clear("g1"));
        assert!(harness.orchestrator.last_known("g1").await.is_none());

        // Same status again is a fresh entry for the new session.
        let published = harness.orchestrator.ingest(snapshot(GameStatus::GameIntro)).await;
        assert_eq!(published.len(), 1);
    }

    #[tokio::test]
    async fn games_are_tracked_independently() {
        let harness = Harness::new();
        harness.orchestrator.ingest(snapshot(GameStatus::GameIntro)).await;
        let other = GameSnapshot::new("g2", GameStatus::GameIntro).with_round(RoundType::Jeopardy);
        let published = harness.orchestrator.ingest(other).await;
        assert_eq!(published.len(), 1);
        assert_eq!(harness.orchestrator.tracked_sessions(), 2);
    }

    #[tokio::test]
    async fn daily_double_clue_reveal_is_announced_explicitly() {
        let harness = Harness::new();
        let intent = harness.orchestrator.announce_daily_double_clue("g1", "dd1");
        assert_eq!(harness.received(), vec![intent]);
    }
}
