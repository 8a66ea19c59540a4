//! Stats aggregation: the only path through which per-competition counters change.

use std::{cmp::Ordering, collections::HashMap, time::SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{CommitOutcome, GameResultCommit},
    dto::{
        game::{GameResultResponse, RecordResultRequest},
        stats::PlayerStatsSummary,
    },
    error::ServiceError,
    services::{
        competition_service::{load_competition, load_game},
        sse_events,
    },
    state::{SharedState, lifecycle::GameEvent},
};

/// Finish a game and credit both participants in one storage unit of work.
///
/// Checks, in order: the game exists, it is not finished yet, the winner plays in it.
/// A failing call writes nothing; a second call on the same game is rejected.
pub async fn record_game_result(
    state: &SharedState,
    game_id: Uuid,
    request: RecordResultRequest,
) -> Result<GameResultResponse, ServiceError> {
    let store = state.require_store().await?;
    let RecordResultRequest {
        winner_id,
        victory_type,
    } = request;

    let result = state
        .run_gated("record_game_result", || async move {
            let game = load_game(store.as_ref(), game_id).await?;
            game.status.apply(GameEvent::Finish)?;

            let loser_id = game.opponent_of(winner_id).ok_or_else(|| {
                ServiceError::InvalidArgument(format!(
                    "winner `{winner_id}` does not play in game `{game_id}`"
                ))
            })?;

            let commit = GameResultCommit {
                game_id,
                competition_id: game.competition_id,
                winner_id,
                loser_id,
                victory_type,
                finished_at: SystemTime::now(),
            };

            match store.commit_game_result(commit).await? {
                CommitOutcome::Applied {
                    game,
                    winner_stats,
                    loser_stats,
                } => Ok(GameResultResponse {
                    game: game.into(),
                    winner_stats: winner_stats.into(),
                    loser_stats: loser_stats.into(),
                }),
                CommitOutcome::GameMissing => {
                    Err(ServiceError::NotFound(format!("game `{game_id}` not found")))
                }
                CommitOutcome::AlreadyFinished => Err(ServiceError::InvalidState(format!(
                    "game `{game_id}` is already finished"
                ))),
                CommitOutcome::StatsMissing { player_id } => Err(ServiceError::NotFound(format!(
                    "no stats for player `{player_id}` in competition `{}`",
                    game.competition_id
                ))),
            }
        })
        .await?;

    info!(
        game_id = %game_id,
        winner_id = %winner_id,
        victory_type = ?victory_type,
        "game result recorded"
    );
    sse_events::broadcast_game_finished(state, &result);
    Ok(result)
}

/// Standings of a competition: most wins first, then fewest losses, then name.
pub async fn competition_stats(
    state: &SharedState,
    competition_id: Uuid,
) -> Result<Vec<PlayerStatsSummary>, ServiceError> {
    let store = state.require_store().await?;
    load_competition(store.as_ref(), competition_id).await?;

    let names: HashMap<Uuid, String> = store
        .list_players()
        .await?
        .into_iter()
        .map(|player| (player.id, player.name))
        .collect();

    let mut rows: Vec<PlayerStatsSummary> = store
        .list_player_stats(competition_id)
        .await?
        .into_iter()
        .map(|row| {
            let name = names.get(&row.player_id).cloned();
            let summary = PlayerStatsSummary::from(row);
            match name {
                Some(name) => summary.with_name(name),
                None => summary,
            }
        })
        .collect();
    rows.sort_by(standings_order);
    Ok(rows)
}

fn standings_order(a: &PlayerStatsSummary, b: &PlayerStatsSummary) -> Ordering {
    b.games_won
        .cmp(&a.games_won)
        .then(a.games_lost.cmp(&b.games_lost))
        .then_with(|| a.player_name.cmp(&b.player_name))
}

/// Counters of one player in one competition.
pub async fn player_stats(
    state: &SharedState,
    competition_id: Uuid,
    player_id: Uuid,
) -> Result<PlayerStatsSummary, ServiceError> {
    let store = state.require_store().await?;
    let row = store
        .find_player_stats(competition_id, player_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "no stats for player `{player_id}` in competition `{competition_id}`"
            ))
        })?;

    let summary = PlayerStatsSummary::from(row);
    Ok(match store.find_player(player_id).await? {
        Some(player) => summary.with_name(player.name),
        None => summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::PlayerStatsEntity;

    fn row(name: &str, won: u32, lost: u32) -> PlayerStatsSummary {
        let mut entity = PlayerStatsEntity::zeroed(Uuid::new_v4(), Uuid::new_v4(), SystemTime::now());
        entity.games_won = won;
        entity.games_lost = lost;
        entity.games_played = won + lost;
        PlayerStatsSummary::from(entity).with_name(name)
    }

    #[test]
    fn standings_rank_wins_then_losses_then_name() {
        let mut rows = vec![
            row("Carla", 2, 1),
            row("Beto", 3, 2),
            row("Ana", 2, 1),
            row("Dani", 2, 0),
        ];
        rows.sort_by(standings_order);

        let names: Vec<_> = rows
            .iter()
            .map(|row| row.player_name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(names, ["Beto", "Dani", "Ana", "Carla"]);
    }
}
