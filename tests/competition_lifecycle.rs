use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use domatch_back::{
    config::AppConfig,
    dao::{
        league_store::{LeagueStore, MemoryLeagueStore},
        models::{GameEntity, VictoryType},
    },
    dto::{
        community::CreateCommunityRequest,
        competition::{CreateCompetitionRequest, UpdateCompetitionRequest},
        game::{CreateGameRequest, RecordResultRequest},
        player::CreatePlayerRequest,
    },
    error::ServiceError,
    services::{community_service, competition_service, player_service, stats_service},
    state::{
        AppState, SharedState,
        lifecycle::{CompetitionStatus, FinishGateError, GameStatus},
    },
};
use uuid::Uuid;

async fn league() -> SharedState {
    AppState::with_store(AppConfig::in_memory(), Arc::new(MemoryLeagueStore::new())).await
}

async fn player(state: &SharedState, name: &str) -> Uuid {
    player_service::create_player(
        state,
        CreatePlayerRequest {
            name: name.into(),
            nickname: None,
            phone: None,
            email: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// A community administered by a fresh player, with one pending competition.
async fn competition(state: &SharedState) -> Uuid {
    let admin = player(state, "Admin").await;
    let community = community_service::create_community(
        state,
        CreateCommunityRequest {
            name: "Dominó del barrio".into(),
            description: None,
            whatsapp_group_id: None,
            admin_id: admin,
        },
    )
    .await
    .unwrap();

    competition_service::create_competition(
        state,
        community.id,
        CreateCompetitionRequest {
            name: "Copa de verano".into(),
            description: None,
            start_date: Some("2025-06-01".into()),
            end_date: Some("2025-08-31".into()),
        },
    )
    .await
    .unwrap()
    .id
}

async fn enrolled(state: &SharedState, competition_id: Uuid, name: &str) -> Uuid {
    let id = player(state, name).await;
    competition_service::enroll_player(state, competition_id, id)
        .await
        .unwrap();
    id
}

async fn game(state: &SharedState, competition_id: Uuid, a: Uuid, b: Uuid) -> Uuid {
    competition_service::create_game(
        state,
        competition_id,
        CreateGameRequest {
            player1_id: a,
            player2_id: b,
        },
    )
    .await
    .unwrap()
    .id
}

async fn win(
    state: &SharedState,
    game_id: Uuid,
    winner_id: Uuid,
) -> Result<domatch_back::dto::game::GameResultResponse, ServiceError> {
    stats_service::record_game_result(
        state,
        game_id,
        RecordResultRequest {
            winner_id,
            victory_type: Some(VictoryType::Simple),
        },
    )
    .await
}

async fn counters(state: &SharedState, competition_id: Uuid, player_id: Uuid) -> (u32, u32, u32) {
    let row = stats_service::player_stats(state, competition_id, player_id)
        .await
        .unwrap();
    (row.games_played, row.games_won, row.games_lost)
}

#[tokio::test]
async fn single_game_scenario_finishes_competition() {
    let state = league().await;
    let c = competition(&state).await;
    let a = enrolled(&state, c, "Ana").await;
    let b = enrolled(&state, c, "Beto").await;
    let g = game(&state, c, a, b).await;

    let result = win(&state, g, a).await.unwrap();
    assert_eq!(result.game.status, GameStatus::Finished);
    assert_eq!(result.game.winner_id, Some(a));
    assert_eq!(result.winner_stats.player_name.as_deref(), Some("Ana"));
    assert_eq!(result.winner_stats.victories.simple, 1);

    assert_eq!(counters(&state, c, a).await, (1, 1, 0));
    assert_eq!(counters(&state, c, b).await, (1, 0, 1));

    let finished = competition_service::finish_competition(&state, c)
        .await
        .unwrap();
    assert_eq!(finished.status, CompetitionStatus::Finished);
}

#[tokio::test]
async fn played_equals_won_plus_lost_after_every_result() {
    let state = league().await;
    let c = competition(&state).await;
    let players = [
        enrolled(&state, c, "Ana").await,
        enrolled(&state, c, "Beto").await,
        enrolled(&state, c, "Carla").await,
        enrolled(&state, c, "Dani").await,
    ];

    let schedule = competition_service::schedule_round_robin(&state, c)
        .await
        .unwrap();
    for (i, game) in schedule.created.iter().enumerate() {
        let winner = if i % 2 == 0 {
            game.player1_id
        } else {
            game.player2_id
        };
        win(&state, game.id, winner).await.unwrap();

        for id in [game.player1_id, game.player2_id] {
            let (played, won, lost) = counters(&state, c, id).await;
            assert_eq!(played, won + lost);
        }
    }

    let standings = stats_service::competition_stats(&state, c).await.unwrap();
    assert_eq!(standings.len(), players.len());
    let total_won: u32 = standings.iter().map(|row| row.games_won).sum();
    assert_eq!(total_won as usize, schedule.created.len());
    assert!(
        standings
            .windows(2)
            .all(|pair| pair[0].games_won >= pair[1].games_won)
    );
}

#[tokio::test]
async fn second_result_is_rejected_without_double_counting() {
    let state = league().await;
    let c = competition(&state).await;
    let a = enrolled(&state, c, "Ana").await;
    let b = enrolled(&state, c, "Beto").await;
    let g = game(&state, c, a, b).await;

    win(&state, g, a).await.unwrap();
    let err = win(&state, g, b).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    assert_eq!(counters(&state, c, a).await, (1, 1, 0));
    assert_eq!(counters(&state, c, b).await, (1, 0, 1));
}

#[tokio::test]
async fn outsider_winner_is_rejected_and_nothing_changes() {
    let state = league().await;
    let c = competition(&state).await;
    let a = enrolled(&state, c, "Ana").await;
    let b = enrolled(&state, c, "Beto").await;
    let outsider = enrolled(&state, c, "Carla").await;
    let g = game(&state, c, a, b).await;

    let err = win(&state, g, outsider).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let game = competition_service::get_game(&state, g).await.unwrap();
    assert_eq!(game.status, GameStatus::Pending);
    assert_eq!(game.winner_id, None);
    for id in [a, b, outsider] {
        assert_eq!(counters(&state, c, id).await, (0, 0, 0));
    }
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let state = league().await;
    let err = win(&state, Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn missing_loser_row_fails_without_partial_writes() {
    let state = league().await;
    let c = competition(&state).await;
    let a = enrolled(&state, c, "Ana").await;
    let b = player(&state, "Beto").await;

    // Bypass enrollment checks so `b` has no stats row.
    let now = SystemTime::now();
    let orphan = GameEntity {
        id: Uuid::new_v4(),
        competition_id: c,
        player1_id: a,
        player2_id: b,
        status: GameStatus::Pending,
        winner_id: None,
        victory_type: None,
        created_at: now,
        updated_at: now,
    };
    let store = state.require_store().await.unwrap();
    store.insert_game(orphan.clone()).await.unwrap();

    let err = win(&state, orphan.id, a).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let game = competition_service::get_game(&state, orphan.id).await.unwrap();
    assert_eq!(game.status, GameStatus::Pending);
    assert_eq!(counters(&state, c, a).await, (0, 0, 0));
}

#[tokio::test]
async fn finish_gate_reports_why_it_refused() {
    let state = league().await;
    let c = competition(&state).await;

    let err = competition_service::finish_competition(&state, c)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PreconditionFailed(FinishGateError::NoFinishedGames)
    ));

    let a = enrolled(&state, c, "Ana").await;
    let b = enrolled(&state, c, "Beto").await;
    let d = enrolled(&state, c, "Dani").await;
    let played = game(&state, c, a, b).await;
    game(&state, c, a, d).await;
    win(&state, played, b).await.unwrap();

    let err = competition_service::finish_competition(&state, c)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PreconditionFailed(FinishGateError::UnfinishedGamesRemain)
    ));
    assert_eq!(err.to_string(), "precondition failed: unfinished games remain");

    let competition = competition_service::get_competition(&state, c).await.unwrap();
    assert_eq!(competition.status, CompetitionStatus::Pending);
}

#[tokio::test]
async fn finished_competition_is_closed() {
    let state = league().await;
    let c = competition(&state).await;
    let a = enrolled(&state, c, "Ana").await;
    let b = enrolled(&state, c, "Beto").await;
    let g = game(&state, c, a, b).await;

    competition_service::start_competition(&state, c).await.unwrap();
    competition_service::start_game(&state, g).await.unwrap();
    win(&state, g, a).await.unwrap();
    competition_service::finish_competition(&state, c)
        .await
        .unwrap();

    let late = player(&state, "Carla").await;
    assert!(matches!(
        competition_service::enroll_player(&state, c, late).await,
        Err(ServiceError::InvalidState(_))
    ));
    assert!(matches!(
        competition_service::create_game(
            &state,
            c,
            CreateGameRequest {
                player1_id: a,
                player2_id: b,
            },
        )
        .await,
        Err(ServiceError::InvalidState(_))
    ));
    assert!(matches!(
        competition_service::finish_competition(&state, c).await,
        Err(ServiceError::InvalidState(_))
    ));
    assert!(matches!(
        competition_service::start_competition(&state, c).await,
        Err(ServiceError::InvalidState(_))
    ));

    let renamed = competition_service::update_competition(
        &state,
        c,
        UpdateCompetitionRequest {
            name: Some("Copa de verano 2025".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.status, CompetitionStatus::Finished);
}

#[tokio::test]
async fn enrollment_is_idempotent() {
    let state = league().await;
    let c = competition(&state).await;
    let a = player(&state, "Ana").await;

    let first = competition_service::enroll_player(&state, c, a).await.unwrap();
    let second = competition_service::enroll_player(&state, c, a).await.unwrap();
    assert!(first.created);
    assert!(!second.created);

    let players = competition_service::list_enrolled_players(&state, c)
        .await
        .unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(counters(&state, c, a).await, (0, 0, 0));
}

#[tokio::test]
async fn games_require_enrolled_players() {
    let state = league().await;
    let c = competition(&state).await;
    let a = enrolled(&state, c, "Ana").await;
    let stranger = player(&state, "Beto").await;

    let err = competition_service::create_game(
        &state,
        c,
        CreateGameRequest {
            player1_id: a,
            player2_id: stranger,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
}

#[tokio::test]
async fn round_robin_covers_pairs_once_and_skips_existing() {
    let state = league().await;
    let c = competition(&state).await;
    let mut players = Vec::new();
    for name in ["Ana", "Beto", "Carla", "Dani", "Eli"] {
        players.push(enrolled(&state, c, name).await);
    }
    game(&state, c, players[1], players[0]).await;

    let n = players.len();
    let schedule = competition_service::schedule_round_robin(&state, c)
        .await
        .unwrap();
    assert_eq!(schedule.created.len(), n * (n - 1) / 2 - 1);
    assert!(schedule.created.iter().all(|game| {
        let pair = [game.player1_id, game.player2_id];
        !(pair.contains(&players[0]) && pair.contains(&players[1]))
    }));

    let again = competition_service::schedule_round_robin(&state, c)
        .await
        .unwrap();
    assert!(again.created.is_empty());

    let games = competition_service::list_games(&state, c).await.unwrap();
    assert_eq!(games.len(), n * (n - 1) / 2);
}

#[tokio::test]
async fn degraded_state_rejects_operations() {
    let state = AppState::new(AppConfig::in_memory());
    let err = player_service::list_players(&state).await.unwrap_err();
    assert!(matches!(err, ServiceError::Degraded));
}

#[tokio::test]
async fn round_robin_under_tight_gate_inserts_all_games_or_none() {
    let store = Arc::new(MemoryLeagueStore::new());
    let state = AppState::with_store(AppConfig::in_memory(), store.clone()).await;
    let c = competition(&state).await;
    for i in 0..40 {
        enrolled(&state, c, &format!("Jugador {i}")).await;
    }

    let hurried = AppState::with_store(
        AppConfig::in_memory().with_gate_timeout(Some(Duration::from_micros(50))),
        store.clone(),
    )
    .await;
    let result = competition_service::schedule_round_robin(&hurried, c).await;
    let persisted = store.list_games(c).await.unwrap().len();

    match result {
        Ok(schedule) => {
            assert_eq!(schedule.created.len(), 780);
            assert_eq!(persisted, 780);
        }
        Err(err) => {
            assert!(matches!(err, ServiceError::Timeout), "{err:?}");
            assert_eq!(persisted, 0);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_results_for_one_game_count_once() {
    let store = Arc::new(MemoryLeagueStore::new());
    let state = AppState::with_store(AppConfig::in_memory(), store.clone()).await;
    let c = competition(&state).await;
    let a = enrolled(&state, c, "Ana").await;
    let b = enrolled(&state, c, "Beto").await;
    let g = game(&state, c, a, b).await;

    // Separate states share the store but not the lifecycle gate.
    let other = AppState::with_store(AppConfig::in_memory(), store.clone()).await;
    let first = tokio::spawn({
        let state = state.clone();
        async move { win(&state, g, a).await }
    });
    let second = tokio::spawn(async move { win(&other, g, b).await });
    let (first, second) = (first.await.unwrap(), second.await.unwrap());

    let winner = match (&first, &second) {
        (Ok(_), Err(ServiceError::InvalidState(_))) => a,
        (Err(ServiceError::InvalidState(_)), Ok(_)) => b,
        outcome => panic!("expected exactly one recorded result, got {outcome:?}"),
    };
    let loser = if winner == a { b } else { a };

    assert_eq!(counters(&state, c, winner).await, (1, 1, 0));
    assert_eq!(counters(&state, c, loser).await, (1, 0, 1));
    let finished = competition_service::get_game(&state, g).await.unwrap();
    assert_eq!(finished.winner_id, Some(winner));
}
