use std::{collections::HashSet, time::SystemTime};

use rand::{rng, seq::SliceRandom};
use time::Date;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        league_store::LeagueStore,
        models::{CompetitionEntity, EnrollmentEntity, GameEntity, PlayerStatsEntity, parse_date},
    },
    dto::{
        competition::{
            CompetitionSummary, CreateCompetitionRequest, EnrolledPlayer, EnrollmentResponse,
            ScheduleResponse, UpdateCompetitionRequest,
        },
        game::{CreateGameRequest, GameSummary},
    },
    error::ServiceError,
    services::{community_service::load_community, player_service::load_player, sse_events},
    state::{
        SharedState,
        lifecycle::{CompetitionEvent, CompetitionStatus, GameEvent, GameStatus, check_finish_gate},
    },
};

/// Create a `pending` competition inside an existing community.
pub async fn create_competition(
    state: &SharedState,
    community_id: Uuid,
    request: CreateCompetitionRequest,
) -> Result<CompetitionSummary, ServiceError> {
    request.validate()?;
    let start_date = parse_optional_date("start_date", request.start_date.as_deref())?;
    let end_date = parse_optional_date("end_date", request.end_date.as_deref())?;
    ensure_date_order(start_date, end_date)?;
    let store = state.require_store().await?;

    // Gated against delete_community, which checks for competitions before deleting.
    let summary = state
        .run_gated("create_competition", || async move {
            load_community(store.as_ref(), community_id).await?;

            let now = SystemTime::now();
            let competition = CompetitionEntity {
                id: Uuid::new_v4(),
                community_id,
                name: request.name.trim().to_owned(),
                description: request.description,
                status: CompetitionStatus::Pending,
                start_date,
                end_date,
                created_at: now,
                updated_at: now,
            };
            store.save_competition(competition.clone()).await?;
            Ok::<_, ServiceError>(CompetitionSummary::from(competition))
        })
        .await?;

    sse_events::broadcast_competition_created(state, &summary);
    Ok(summary)
}

/// Edit a competition's metadata. Allowed in every status; the status itself is untouched.
pub async fn update_competition(
    state: &SharedState,
    id: Uuid,
    request: UpdateCompetitionRequest,
) -> Result<CompetitionSummary, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;

    state
        .run_gated("update_competition", || async move {
            let mut competition = load_competition(store.as_ref(), id).await?;

            if let Some(name) = request.name {
                competition.name = name.trim().to_owned();
            }
            if let Some(description) = request.description {
                competition.description = description;
            }
            if let Some(raw) = request.start_date {
                competition.start_date = parse_optional_date("start_date", raw.as_deref())?;
            }
            if let Some(raw) = request.end_date {
                competition.end_date = parse_optional_date("end_date", raw.as_deref())?;
            }
            ensure_date_order(competition.start_date, competition.end_date)?;

            competition.updated_at = SystemTime::now();
            store.save_competition(competition.clone()).await?;
            Ok::<_, ServiceError>(CompetitionSummary::from(competition))
        })
        .await
}

/// Delete a competition without games, together with its enrollments and stats rows.
pub async fn delete_competition(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;

    state
        .run_gated("delete_competition", || async move {
            load_competition(store.as_ref(), id).await?;
            let games = store.list_games(id).await?;
            if !games.is_empty() {
                return Err(ServiceError::InvalidState(format!(
                    "competition `{id}` has {} game(s) and cannot be deleted",
                    games.len()
                )));
            }
            if !store.delete_competition(id).await? {
                return Err(ServiceError::NotFound(format!("competition `{id}` not found")));
            }
            Ok(())
        })
        .await
}

/// Fetch one competition.
pub async fn get_competition(
    state: &SharedState,
    id: Uuid,
) -> Result<CompetitionSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_competition(store.as_ref(), id).await?.into())
}

/// Competitions of a community, newest first.
pub async fn list_competitions(
    state: &SharedState,
    community_id: Uuid,
) -> Result<Vec<CompetitionSummary>, ServiceError> {
    let store = state.require_store().await?;
    load_community(store.as_ref(), community_id).await?;
    let competitions = store.list_competitions(community_id).await?;
    Ok(competitions.into_iter().map(Into::into).collect())
}

/// Move a competition from `pending` to `active`.
pub async fn start_competition(
    state: &SharedState,
    id: Uuid,
) -> Result<CompetitionSummary, ServiceError> {
    let store = state.require_store().await?;

    let summary = state
        .run_gated("start_competition", || async move {
            let competition = load_competition(store.as_ref(), id).await?;
            transition_competition(store.as_ref(), competition, CompetitionEvent::Start).await
        })
        .await?;

    info!(competition_id = %id, "competition started");
    sse_events::broadcast_competition_started(state, &summary);
    Ok(summary)
}

/// Close a competition once every game is finished and at least one exists.
///
/// Fails with [`ServiceError::PreconditionFailed`] carrying `no finished games` or
/// `unfinished games remain`. No counter is touched.
pub async fn finish_competition(
    state: &SharedState,
    id: Uuid,
) -> Result<CompetitionSummary, ServiceError> {
    let store = state.require_store().await?;

    let summary = state
        .run_gated("finish_competition", || async move {
            let competition = load_competition(store.as_ref(), id).await?;
            // Reject a finished competition before looking at its games.
            competition.status.apply(CompetitionEvent::Finish)?;

            let games = store.list_games(id).await?;
            check_finish_gate(games.iter().map(|game| game.status))?;

            transition_competition(store.as_ref(), competition, CompetitionEvent::Finish).await
        })
        .await?;

    info!(competition_id = %id, "competition finished");
    sse_events::broadcast_competition_finished(state, &summary);
    Ok(summary)
}

async fn transition_competition(
    store: &dyn LeagueStore,
    mut competition: CompetitionEntity,
    event: CompetitionEvent,
) -> Result<CompetitionSummary, ServiceError> {
    let next = competition.status.apply(event)?;
    if !store
        .update_competition_status(competition.id, competition.status, next)
        .await?
    {
        return Err(ServiceError::InvalidState(format!(
            "competition `{}` changed status concurrently",
            competition.id
        )));
    }
    competition.status = next;
    competition.updated_at = SystemTime::now();
    Ok(competition.into())
}

/// Enroll a player and create their zeroed stats row. Repeating it is a no-op.
pub async fn enroll_player(
    state: &SharedState,
    competition_id: Uuid,
    player_id: Uuid,
) -> Result<EnrollmentResponse, ServiceError> {
    let store = state.require_store().await?;

    let created = state
        .run_gated("enroll_player", || async move {
            let competition = load_competition(store.as_ref(), competition_id).await?;
            ensure_open(&competition, "enroll players")?;
            load_player(store.as_ref(), player_id).await?;

            let now = SystemTime::now();
            let enrollment = EnrollmentEntity {
                id: Uuid::new_v4(),
                competition_id,
                player_id,
                created_at: now,
            };
            let stats = PlayerStatsEntity::zeroed(competition_id, player_id, now);
            Ok::<_, ServiceError>(store.enroll_player(enrollment, stats).await?)
        })
        .await?;

    if created {
        info!(competition_id = %competition_id, player_id = %player_id, "player enrolled");
        sse_events::broadcast_player_enrolled(state, competition_id, player_id);
    }

    Ok(EnrollmentResponse {
        competition_id,
        player_id,
        created,
    })
}

/// Players enrolled in a competition, in enrollment order.
pub async fn list_enrolled_players(
    state: &SharedState,
    competition_id: Uuid,
) -> Result<Vec<EnrolledPlayer>, ServiceError> {
    let store = state.require_store().await?;
    load_competition(store.as_ref(), competition_id).await?;

    let mut players = Vec::new();
    for enrollment in store.list_enrollments(competition_id).await? {
        let player = load_player(store.as_ref(), enrollment.player_id).await?;
        players.push(EnrolledPlayer::new(enrollment.created_at, player.into()));
    }
    Ok(players)
}

/// Create a `pending` game between two distinct enrolled players.
pub async fn create_game(
    state: &SharedState,
    competition_id: Uuid,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;

    let game = state
        .run_gated("create_game", || async move {
            let competition = load_competition(store.as_ref(), competition_id).await?;
            ensure_open(&competition, "create games")?;

            let enrolled = enrolled_player_ids(store.as_ref(), competition_id).await?;
            for player_id in [request.player1_id, request.player2_id] {
                if !enrolled.contains(&player_id) {
                    return Err(ServiceError::InvalidArgument(format!(
                        "player `{player_id}` is not enrolled in competition `{competition_id}`"
                    )));
                }
            }

            let game = new_game(competition_id, request.player1_id, request.player2_id);
            store.insert_game(game.clone()).await?;
            Ok(GameSummary::from(game))
        })
        .await?;

    sse_events::broadcast_game_created(state, &game);
    Ok(game)
}

/// Move a game from `pending` to `in_progress`.
pub async fn start_game(state: &SharedState, game_id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_store().await?;

    let game = state
        .run_gated("start_game", || async move {
            let mut game = load_game(store.as_ref(), game_id).await?;
            let next = game.status.apply(GameEvent::Start)?;
            if !store.update_game_status(game_id, game.status, next).await? {
                return Err(ServiceError::InvalidState(format!(
                    "game `{game_id}` changed status concurrently"
                )));
            }
            game.status = next;
            game.updated_at = SystemTime::now();
            Ok(GameSummary::from(game))
        })
        .await?;

    sse_events::broadcast_game_started(state, &game);
    Ok(game)
}

/// Fetch one game.
pub async fn get_game(state: &SharedState, game_id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_game(store.as_ref(), game_id).await?.into())
}

/// Games of a competition in creation order.
pub async fn list_games(
    state: &SharedState,
    competition_id: Uuid,
) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_store().await?;
    load_competition(store.as_ref(), competition_id).await?;
    let games = store.list_games(competition_id).await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// Create a pending game for every pair of enrolled players that has not met yet,
/// in random order.
pub async fn schedule_round_robin(
    state: &SharedState,
    competition_id: Uuid,
) -> Result<ScheduleResponse, ServiceError> {
    let store = state.require_store().await?;

    let created = state
        .run_gated("schedule_round_robin", || async move {
            let competition = load_competition(store.as_ref(), competition_id).await?;
            ensure_open(&competition, "schedule games")?;

            let players: Vec<Uuid> = store
                .list_enrollments(competition_id)
                .await?
                .into_iter()
                .map(|enrollment| enrollment.player_id)
                .collect();
            if players.len() < 2 {
                return Err(ServiceError::InvalidArgument(
                    "round robin needs at least two enrolled players".into(),
                ));
            }

            let existing = store.list_games(competition_id).await?;
            let mut pairs = missing_pairings(&players, &existing);
            pairs.shuffle(&mut rng());

            let games: Vec<GameEntity> = pairs
                .into_iter()
                .map(|(player1_id, player2_id)| new_game(competition_id, player1_id, player2_id))
                .collect();
            store.insert_games(games.clone()).await?;
            Ok(games.into_iter().map(GameSummary::from).collect::<Vec<_>>())
        })
        .await?;

    info!(competition_id = %competition_id, count = created.len(), "round robin scheduled");
    for game in &created {
        sse_events::broadcast_game_created(state, game);
    }
    Ok(ScheduleResponse { created })
}

/// Unordered pairs of `players` without a game in `existing`.
fn missing_pairings(players: &[Uuid], existing: &[GameEntity]) -> Vec<(Uuid, Uuid)> {
    let key = |a: Uuid, b: Uuid| if a < b { (a, b) } else { (b, a) };
    let played: HashSet<(Uuid, Uuid)> = existing
        .iter()
        .map(|game| key(game.player1_id, game.player2_id))
        .collect();

    let mut pairs = Vec::new();
    for (i, &a) in players.iter().enumerate() {
        for &b in &players[i + 1..] {
            if a != b && !played.contains(&key(a, b)) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

fn new_game(competition_id: Uuid, player1_id: Uuid, player2_id: Uuid) -> GameEntity {
    let now = SystemTime::now();
    GameEntity {
        id: Uuid::new_v4(),
        competition_id,
        player1_id,
        player2_id,
        status: GameStatus::Pending,
        winner_id: None,
        victory_type: None,
        created_at: now,
        updated_at: now,
    }
}

fn ensure_open(competition: &CompetitionEntity, action: &str) -> Result<(), ServiceError> {
    if competition.status.is_open() {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "cannot {action} in {} competition `{}`",
            competition.status, competition.id
        )))
    }
}

async fn enrolled_player_ids(
    store: &dyn LeagueStore,
    competition_id: Uuid,
) -> Result<HashSet<Uuid>, ServiceError> {
    Ok(store
        .list_enrollments(competition_id)
        .await?
        .into_iter()
        .map(|enrollment| enrollment.player_id)
        .collect())
}

fn parse_optional_date(field: &str, raw: Option<&str>) -> Result<Option<Date>, ServiceError> {
    raw.map(|raw| {
        parse_date(raw).map_err(|err| {
            ServiceError::InvalidArgument(format!("{field} must be YYYY-MM-DD: {err}"))
        })
    })
    .transpose()
}

fn ensure_date_order(start: Option<Date>, end: Option<Date>) -> Result<(), ServiceError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ServiceError::InvalidArgument(format!(
            "end_date {end} is before start_date {start}"
        ))),
        _ => Ok(()),
    }
}

/// Load a competition or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_competition(
    store: &dyn LeagueStore,
    id: Uuid,
) -> Result<CompetitionEntity, ServiceError> {
    store
        .find_competition(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("competition `{id}` not found")))
}

/// Load a game or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_game(store: &dyn LeagueStore, id: Uuid) -> Result<GameEntity, ServiceError> {
    store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::league_store::MemoryLeagueStore,
        dto::{community::CreateCommunityRequest, player::CreatePlayerRequest},
        services::{community_service, player_service},
        state::AppState,
    };

    fn copa() -> CreateCompetitionRequest {
        CreateCompetitionRequest {
            name: "Copa de invierno".into(),
            description: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn pairings_cover_every_unordered_pair_once() {
        let players: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let pairs = missing_pairings(&players, &[]);
        assert_eq!(pairs.len(), 10);

        let unique: HashSet<(Uuid, Uuid)> = pairs
            .iter()
            .map(|&(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn pairings_skip_games_in_either_orientation() {
        let players: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let existing = [new_game(Uuid::new_v4(), players[1], players[0])];
        let pairs = missing_pairings(&players, &existing);

        assert_eq!(pairs.len(), 2);
        assert!(!pairs.contains(&(players[0], players[1])));
    }

    #[test]
    fn date_order_is_enforced() {
        let start = parse_date("2025-03-01").ok();
        let end = parse_date("2025-02-01").ok();
        assert!(ensure_date_order(start, end).is_err());
        assert!(ensure_date_order(end, start).is_ok());
        assert!(ensure_date_order(start, None).is_ok());
    }

    #[tokio::test]
    async fn community_delete_and_competition_create_wait_for_the_gate() {
        let config = AppConfig::in_memory().with_gate_timeout(Some(Duration::from_millis(20)));
        let state = AppState::with_store(config, Arc::new(MemoryLeagueStore::new())).await;
        let admin = player_service::create_player(
            &state,
            CreatePlayerRequest {
                name: "Admin".into(),
                nickname: None,
                phone: None,
                email: None,
            },
        )
        .await
        .unwrap();
        let community = community_service::create_community(
            &state,
            CreateCommunityRequest {
                name: "Dominó del puerto".into(),
                description: None,
                whatsapp_group_id: None,
                admin_id: admin.id,
            },
        )
        .await
        .unwrap();

        let gate = state.hold_lifecycle_gate().await;
        let created = create_competition(&state, community.id, copa()).await;
        let deleted = community_service::delete_community(&state, community.id).await;
        drop(gate);

        assert!(matches!(created, Err(ServiceError::Timeout)));
        assert!(matches!(deleted, Err(ServiceError::Timeout)));
        assert!(
            list_competitions(&state, community.id)
                .await
                .unwrap()
                .is_empty()
        );

        create_competition(&state, community.id, copa())
            .await
            .unwrap();
        let err = community_service::delete_community(&state, community.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(
            community_service::get_community(&state, community.id)
                .await
                .is_ok()
        );
    }
}
