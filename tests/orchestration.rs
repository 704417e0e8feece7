use std::{sync::Arc, time::Duration};

use clue_board_back::{
    animation::{ExecuteConfig, RunOutcome},
    config::AppConfig,
    dao::clue_lookup::memory::InMemoryClueLookup,
    dto::snapshot::SnapshotRequest,
    services::{auto_player, catch_up_service, snapshot_service, sse_events},
    state::{
        AppState, SharedState,
        game::{GameSnapshot, GameStatus, RoundType},
        intent::{Intent, IntentKind},
    },
};

fn app(daily_doubles: &[&str], config: AppConfig) -> SharedState {
    let lookup = InMemoryClueLookup::new(daily_doubles.iter().map(|id| id.to_string()));
    AppState::new(config, Arc::new(lookup))
}

fn request(json: &str) -> SnapshotRequest {
    serde_json::from_str(json).expect("valid snapshot json")
}

fn kinds(intents: &[Intent]) -> Vec<IntentKind> {
    intents.iter().map(Intent::kind).collect()
}

#[tokio::test]
async fn a_full_round_publishes_each_intent_once() {
    let state = app(&["c2"], AppConfig::default());
    let orchestrator = state.orchestrator();
    let base = GameSnapshot::new("g1", GameStatus::Lobby).with_round(RoundType::Jeopardy);

    assert!(orchestrator.ingest(base.clone()).await.is_empty());

    let intro = GameSnapshot {
        status: GameStatus::GameIntro,
        ..base.clone()
    };
    assert_eq!(kinds(&orchestrator.ingest(intro.clone()).await), vec![IntentKind::BoardIntro]);
    assert!(orchestrator.ingest(intro).await.is_empty());

    for category in 1..=2 {
        let snapshot = GameSnapshot::new("g1", GameStatus::IntroducingCategories)
            .with_round(RoundType::Jeopardy)
            .with_category(category);
        assert_eq!(
            orchestrator.ingest(snapshot).await,
            vec![Intent::CategoryIntro {
                game_id: "g1".into(),
                round: Some(RoundType::Jeopardy),
                category_number: category,
            }]
        );
    }

    let regular = GameSnapshot::new("g1", GameStatus::InProgress)
        .with_round(RoundType::Jeopardy)
        .with_category(2)
        .with_focused_clue("c1");
    assert_eq!(kinds(&orchestrator.ingest(regular).await), vec![IntentKind::ClueReveal]);

    let daily_double = GameSnapshot::new("g1", GameStatus::InProgress)
        .with_round(RoundType::Jeopardy)
        .with_category(2)
        .with_focused_clue("c2")
        .with_focused_player("p1");
    assert_eq!(
        kinds(&orchestrator.ingest(daily_double).await),
        vec![IntentKind::DailyDoubleReveal, IntentKind::PlayerBuzzIn]
    );

    let transition = GameSnapshot::new("g1", GameStatus::RoundTransition).with_round(RoundType::Double);
    assert_eq!(
        orchestrator.ingest(transition).await,
        vec![Intent::RoundTransition {
            game_id: "g1".into(),
            from_round: RoundType::Jeopardy,
            to_round: RoundType::Double,
        }]
    );
}

#[tokio::test]
async fn published_intents_reach_the_sse_hub() {
    let state = app(&[], AppConfig::default());
    state.retain_subscription(sse_events::bridge_intents(&state));
    let mut receiver = state.public_sse().subscribe();

    snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(r#"{"status":"game_intro","currentRound":"jeopardy"}"#),
    )
    .await
    .unwrap();

    let event = receiver.recv().await.unwrap();
    assert_eq!(event.event.as_deref(), Some("intent.board_intro"));
    let intent: Intent = serde_json::from_str(&event.data).unwrap();
    assert_eq!(
        intent,
        Intent::BoardIntro {
            game_id: "g1".into(),
            round: RoundType::Jeopardy,
        }
    );
}

#[tokio::test]
async fn recent_intent_is_visible_to_late_subscribers() {
    let state = app(&[], AppConfig::default());
    snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(r#"{"status":"in_progress","currentRound":"jeopardy","focusedClueId":"c7"}"#),
    )
    .await
    .unwrap();

    let recent = snapshot_service::recent_intent(&state, "g1", "clue_reveal").unwrap();
    assert!(recent.recently_published);
    assert_eq!(
        recent.intent,
        Some(Intent::ClueReveal {
            game_id: "g1".into(),
            clue_id: "c7".into(),
        })
    );

    let other_game = snapshot_service::recent_intent(&state, "g2", "ClueReveal").unwrap();
    assert!(!other_game.recently_published);
    assert!(snapshot_service::recent_intent(&state, "g1", "buzz").is_err());
}

#[tokio::test]
async fn unlocked_buzzer_without_clue_is_rejected() {
    let state = app(&[], AppConfig::default());
    let result = snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(r#"{"status":"in_progress","isBuzzerLocked":false}"#),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(state.orchestrator().tracked_sessions(), 0);
}

#[tokio::test]
async fn late_observer_fast_forwards_to_current_clue() {
    let state = app(&[], AppConfig::default());
    snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(
            r#"{"status":"in_progress","currentRound":"double","currentIntroductionCategory":6,"focusedClueId":"c3"}"#,
        ),
    )
    .await
    .unwrap();

    let list = catch_up_service::catch_up_list(&state, "g1").await.unwrap();
    assert_eq!(
        kinds(&list.intents),
        vec![IntentKind::BoardIntro, IntentKind::CategoryIntro, IntentKind::ClueReveal]
    );

    for target in ["board", "category-6", "clue-c3"] {
        state.stage().mount(target);
    }
    let run = catch_up_service::run_catch_up(&state, "g1").await.unwrap();
    assert_eq!(run.executed.len(), 3);
    assert!(run.skipped.is_empty());
    assert!(state.stage().target("clue-c3").unwrap().highlighted);
    assert_eq!(
        state.stage().target("board").unwrap().label.as_deref(),
        Some("double")
    );

    // Already played on the display: a second run has nothing left to do.
    let again = catch_up_service::run_catch_up(&state, "g1").await.unwrap();
    assert!(again.executed.is_empty());
}

#[tokio::test(start_paused = true)]
async fn catch_up_skips_targets_that_never_mount() {
    let state = app(&[], AppConfig::default());
    state.stage().mount("board");
    snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(r#"{"status":"in_progress","currentRound":"jeopardy","focusedPlayerId":"p4"}"#),
    )
    .await
    .unwrap();

    let run = catch_up_service::run_catch_up(&state, "g1").await.unwrap();
    assert_eq!(kinds(&run.executed), vec![IntentKind::BoardIntro]);
    assert_eq!(kinds(&run.skipped), vec![IntentKind::PlayerBuzzIn]);
    assert!(state.runtime().is_idle("PlayerBuzzIn:g1:p4"));
}

#[tokio::test(start_paused = true)]
async fn auto_player_animates_published_intents() {
    let state = app(&[], AppConfig::default());
    state.retain_subscription(auto_player::spawn_auto_player(&state));
    state.stage().mount("board");

    snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(r#"{"status":"game_intro","currentRound":"jeopardy"}"#),
    )
    .await
    .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(state.runtime().has_played("BoardIntro:g1:jeopardy"));
    assert!(state.stage().target("board").unwrap().visible);
}

#[tokio::test]
async fn clearing_a_game_lets_its_animations_play_again() {
    let state = app(&[], AppConfig::default());
    state.stage().mount("board");
    snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(r#"{"status":"game_intro","currentRound":"jeopardy"}"#),
    )
    .await
    .unwrap();

    let intent = Intent::BoardIntro {
        game_id: "g1".into(),
        round: RoundType::Jeopardy,
    };
    state
        .runtime()
        .play(state.registry(), state.stage(), &intent, ExecuteConfig::instant())
        .await
        .unwrap();
    assert!(state.runtime().has_played(&intent.animation_key()));

    assert_eq!(snapshot_service::clear_game(&state, "g1").unwrap(), 1);
    assert!(state.runtime().is_idle(&intent.animation_key()));
    assert!(snapshot_service::clear_game(&state, "g1").is_err());
}

#[tokio::test]
async fn daily_double_clue_reveal_requires_focused_clue() {
    let state = app(&["c5"], AppConfig::default());
    snapshot_service::ingest_snapshot(
        &state,
        "g1".into(),
        request(r#"{"status":"in_progress","currentRound":"jeopardy","focusedClueId":"c5"}"#),
    )
    .await
    .unwrap();

    assert!(
        snapshot_service::reveal_daily_double_clue(&state, "g1", "c9")
            .await
            .is_err()
    );
    let intent = snapshot_service::reveal_daily_double_clue(&state, "g1", "c5")
        .await
        .unwrap();
    assert_eq!(intent.kind(), IntentKind::DailyDoubleClueReveal);
    assert!(
        state
            .bus()
            .was_recently_published(IntentKind::DailyDoubleClueReveal, "g1")
    );
}

#[tokio::test]
async fn game_ids_with_key_separator_are_rejected() {
    let state = app(&[], AppConfig::default());
    let result = snapshot_service::ingest_snapshot(
        &state,
        "a:b".into(),
        request(r#"{"status":"game_intro","currentRound":"jeopardy"}"#),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(state.orchestrator().tracked_sessions(), 0);
    assert!(!state.bus().was_recently_published(IntentKind::BoardIntro, "a:b"));
}

#[tokio::test]
async fn returning_player_and_category_numbers_animate_again() {
    let state = app(&[], AppConfig::default());
    for target in ["player-p1", "category-1"] {
        state.stage().mount(target);
    }
    let snapshots = [
        r#"{"status":"introducing_categories","currentRound":"jeopardy","currentIntroductionCategory":1}"#,
        r#"{"status":"in_progress","currentRound":"jeopardy","focusedClueId":"c1","focusedPlayerId":"p1"}"#,
        r#"{"status":"in_progress","currentRound":"jeopardy"}"#,
        r#"{"status":"in_progress","currentRound":"jeopardy","focusedClueId":"c2","focusedPlayerId":"p1"}"#,
        r#"{"status":"round_transition","currentRound":"double"}"#,
        r#"{"status":"introducing_categories","currentRound":"double","currentIntroductionCategory":1}"#,
    ];

    let mut outcomes = Vec::new();
    for json in snapshots {
        let response = snapshot_service::ingest_snapshot(&state, "g1".into(), request(json))
            .await
            .unwrap();
        for intent in response.intents {
            if !matches!(intent.kind(), IntentKind::PlayerBuzzIn | IntentKind::CategoryIntro) {
                continue;
            }
            let outcome = state
                .runtime()
                .play(state.registry(), state.stage(), &intent, ExecuteConfig::instant())
                .await
                .unwrap();
            outcomes.push((intent.animation_key(), outcome));
        }
    }

    assert_eq!(
        outcomes,
        vec![
            ("CategoryIntro:g1:jeopardy/1".to_string(), RunOutcome::Completed),
            ("PlayerBuzzIn:g1:c1/p1".to_string(), RunOutcome::Completed),
            ("PlayerBuzzIn:g1:c2/p1".to_string(), RunOutcome::Completed),
            ("CategoryIntro:g1:double/1".to_string(), RunOutcome::Completed),
        ]
    );
}
