//! In-process league store. Every table lives behind one lock so multi-row units of
//! work are applied while holding a single write guard.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    dao::{
        league_store::LeagueStore,
        models::{
            CommitOutcome, CommunityEntity, CommunityMemberEntity, CompetitionEntity,
            EnrollmentEntity, GameEntity, GameResultCommit, PlayerEntity, PlayerStatsEntity,
        },
        storage::StorageResult,
    },
    state::lifecycle::{CompetitionStatus, GameStatus},
};

type ParticipantKey = (Uuid, Uuid);

#[derive(Default)]
struct Tables {
    players: IndexMap<Uuid, PlayerEntity>,
    communities: IndexMap<Uuid, CommunityEntity>,
    members: IndexMap<ParticipantKey, CommunityMemberEntity>,
    competitions: IndexMap<Uuid, CompetitionEntity>,
    enrollments: IndexMap<ParticipantKey, EnrollmentEntity>,
    games: IndexMap<Uuid, GameEntity>,
    stats: IndexMap<ParticipantKey, PlayerStatsEntity>,
}

impl Tables {
    fn commit_game_result(&mut self, commit: &GameResultCommit) -> CommitOutcome {
        let Some(game) = self.games.get(&commit.game_id) else {
            return CommitOutcome::GameMissing;
        };
        if game.status.is_finished() {
            return CommitOutcome::AlreadyFinished;
        }

        let competition_id = game.competition_id;
        let winner_key = (competition_id, commit.winner_id);
        let loser_key = (competition_id, commit.loser_id);
        for (key, player_id) in [(winner_key, commit.winner_id), (loser_key, commit.loser_id)] {
            if !self.stats.contains_key(&key) {
                return CommitOutcome::StatsMissing { player_id };
            }
        }

        // Every precondition holds from here on; the writes below cannot fail.
        let game = match self.games.get_mut(&commit.game_id) {
            Some(game) => {
                game.status = GameStatus::Finished;
                game.winner_id = Some(commit.winner_id);
                game.victory_type = commit.victory_type;
                game.updated_at = commit.finished_at;
                game.clone()
            }
            None => return CommitOutcome::GameMissing,
        };

        let mut rows = Vec::with_capacity(2);
        for (key, increment) in [
            (winner_key, commit.winner_increment()),
            (loser_key, commit.loser_increment()),
        ] {
            if let Some(row) = self.stats.get_mut(&key) {
                row.apply(&increment, commit.finished_at);
                rows.push(row.clone());
            }
        }
        let loser_stats = rows.pop();
        let winner_stats = rows.pop();

        match (winner_stats, loser_stats) {
            (Some(winner_stats), Some(loser_stats)) => CommitOutcome::Applied {
                game,
                winner_stats,
                loser_stats,
            },
            _ => CommitOutcome::StatsMissing {
                player_id: commit.loser_id,
            },
        }
    }
}

/// League store keeping everything in memory; data is lost on restart.
#[derive(Clone, Default)]
pub struct MemoryLeagueStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryLeagueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T: Clone>(rows: Vec<(T, std::time::SystemTime)>) -> Vec<T> {
    let mut rows = rows;
    rows.sort_by(|(_, a), (_, b)| b.cmp(a));
    rows.into_iter().map(|(row, _)| row).collect()
}

impl LeagueStore for MemoryLeagueStore {
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.players.insert(player.id, player);
            Ok(())
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.players.get(&id).cloned()) })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut players = tables
                .read()
                .await
                .players
                .values()
                .cloned()
                .collect::<Vec<_>>();
            players.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(players)
        })
    }

    fn save_community(
        &self,
        community: CommunityEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .communities
                .insert(community.id, community);
            Ok(())
        })
    }

    fn find_community(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CommunityEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.communities.get(&id).cloned()) })
    }

    fn list_communities(&self) -> BoxFuture<'static, StorageResult<Vec<CommunityEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let rows = tables
                .read()
                .await
                .communities
                .values()
                .map(|community| (community.clone(), community.created_at))
                .collect();
            Ok(newest_first(rows))
        })
    }

    fn delete_community(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if guard.communities.shift_remove(&id).is_none() {
                return Ok(false);
            }
            guard
                .members
                .retain(|(community_id, _), _| *community_id != id);
            Ok(true)
        })
    }

    fn insert_member(
        &self,
        member: CommunityMemberEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let key = (member.community_id, member.user_id);
            if guard.members.contains_key(&key) {
                return Ok(false);
            }
            guard.members.insert(key, member);
            Ok(true)
        })
    }

    fn delete_member(
        &self,
        community_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .write()
                .await
                .members
                .shift_remove(&(community_id, user_id))
                .is_some())
        })
    }

    fn list_members(
        &self,
        community_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CommunityMemberEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .members
                .values()
                .filter(|member| member.community_id == community_id)
                .cloned()
                .collect())
        })
    }

    fn save_competition(
        &self,
        competition: CompetitionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .competitions
                .insert(competition.id, competition);
            Ok(())
        })
    }

    fn find_competition(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.competitions.get(&id).cloned()) })
    }

    fn list_competitions(
        &self,
        community_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let rows = tables
                .read()
                .await
                .competitions
                .values()
                .filter(|competition| competition.community_id == community_id)
                .map(|competition| (competition.clone(), competition.created_at))
                .collect();
            Ok(newest_first(rows))
        })
    }

    fn delete_competition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if guard.competitions.shift_remove(&id).is_none() {
                return Ok(false);
            }
            guard
                .enrollments
                .retain(|(competition_id, _), _| *competition_id != id);
            guard
                .stats
                .retain(|(competition_id, _), _| *competition_id != id);
            Ok(true)
        })
    }

    fn update_competition_status(
        &self,
        id: Uuid,
        from: CompetitionStatus,
        to: CompetitionStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            match guard.competitions.get_mut(&id) {
                Some(competition) if competition.status == from => {
                    competition.status = to;
                    competition.updated_at = std::time::SystemTime::now();
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn enroll_player(
        &self,
        enrollment: EnrollmentEntity,
        stats: PlayerStatsEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let key = (enrollment.competition_id, enrollment.player_id);
            if guard.enrollments.contains_key(&key) {
                return Ok(false);
            }
            guard.enrollments.insert(key, enrollment);
            guard.stats.entry(key).or_insert(stats);
            Ok(true)
        })
    }

    fn list_enrollments(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrollmentEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .enrollments
                .values()
                .filter(|enrollment| enrollment.competition_id == competition_id)
                .cloned()
                .collect())
        })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.games.insert(game.id, game);
            Ok(())
        })
    }

    fn insert_games(&self, games: Vec<GameEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            guard
                .games
                .extend(games.into_iter().map(|game| (game.id, game)));
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.games.get(&id).cloned()) })
    }

    fn list_games(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .games
                .values()
                .filter(|game| game.competition_id == competition_id)
                .cloned()
                .collect())
        })
    }

    fn update_game_status(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            match guard.games.get_mut(&id) {
                Some(game) if game.status == from => {
                    game.status = to;
                    game.updated_at = std::time::SystemTime::now();
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn find_player_stats(
        &self,
        competition_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerStatsEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .stats
                .get(&(competition_id, player_id))
                .cloned())
        })
    }

    fn list_player_stats(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerStatsEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .stats
                .values()
                .filter(|row| row.competition_id == competition_id)
                .cloned()
                .collect())
        })
    }

    fn commit_game_result(
        &self,
        commit: GameResultCommit,
    ) -> BoxFuture<'static, StorageResult<CommitOutcome>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.write().await.commit_game_result(&commit)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::VictoryType;

    fn game(competition_id: Uuid, p1: Uuid, p2: Uuid) -> GameEntity {
        let now = SystemTime::now();
        GameEntity {
            id: Uuid::new_v4(),
            competition_id,
            player1_id: p1,
            player2_id: p2,
            status: GameStatus::Pending,
            winner_id: None,
            victory_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn enroll(store: &MemoryLeagueStore, competition_id: Uuid, player_id: Uuid) -> bool {
        let now = SystemTime::now();
        store
            .enroll_player(
                EnrollmentEntity {
                    id: Uuid::new_v4(),
                    competition_id,
                    player_id,
                    created_at: now,
                },
                PlayerStatsEntity::zeroed(competition_id, player_id, now),
            )
            .await
            .unwrap()
    }

    fn commit(game: &GameEntity, winner_id: Uuid, loser_id: Uuid) -> GameResultCommit {
        GameResultCommit {
            game_id: game.id,
            competition_id: game.competition_id,
            winner_id,
            loser_id,
            victory_type: Some(VictoryType::Simple),
            finished_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn enrollment_is_idempotent() {
        let store = MemoryLeagueStore::new();
        let (competition, player) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(enroll(&store, competition, player).await);
        assert!(!enroll(&store, competition, player).await);

        assert_eq!(store.list_enrollments(competition).await.unwrap().len(), 1);
        assert_eq!(store.list_player_stats(competition).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn commit_updates_game_and_both_rows() {
        let store = MemoryLeagueStore::new();
        let (competition, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        enroll(&store, competition, a).await;
        enroll(&store, competition, b).await;
        let game = game(competition, a, b);
        store.insert_game(game.clone()).await.unwrap();

        let outcome = store.commit_game_result(commit(&game, a, b)).await.unwrap();
        let CommitOutcome::Applied {
            game: finished,
            winner_stats,
            loser_stats,
        } = outcome
        else {
            panic!("expected applied outcome, got {outcome:?}");
        };

        assert_eq!(finished.status, GameStatus::Finished);
        assert_eq!(finished.winner_id, Some(a));
        assert_eq!(
            (winner_stats.games_played, winner_stats.games_won, winner_stats.games_lost),
            (1, 1, 0)
        );
        assert_eq!(winner_stats.victories.simple, 1);
        assert_eq!(
            (loser_stats.games_played, loser_stats.games_won, loser_stats.games_lost),
            (1, 0, 1)
        );
    }

    #[tokio::test]
    async fn second_commit_reports_already_finished() {
        let store = MemoryLeagueStore::new();
        let (competition, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        enroll(&store, competition, a).await;
        enroll(&store, competition, b).await;
        let game = game(competition, a, b);
        store.insert_game(game.clone()).await.unwrap();

        store.commit_game_result(commit(&game, a, b)).await.unwrap();
        let outcome = store.commit_game_result(commit(&game, b, a)).await.unwrap();
        assert_eq!(outcome, CommitOutcome::AlreadyFinished);

        let stats = store.find_player_stats(competition, b).await.unwrap().unwrap();
        assert_eq!((stats.games_played, stats.games_won), (1, 0));
    }

    #[tokio::test]
    async fn missing_loser_row_leaves_everything_untouched() {
        let store = MemoryLeagueStore::new();
        let (competition, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        enroll(&store, competition, a).await;
        let game = game(competition, a, b);
        store.insert_game(game.clone()).await.unwrap();

        let outcome = store.commit_game_result(commit(&game, a, b)).await.unwrap();
        assert_eq!(outcome, CommitOutcome::StatsMissing { player_id: b });

        let stored = store.find_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.status, GameStatus::Pending);
        assert_eq!(stored.winner_id, None);
        let winner = store.find_player_stats(competition, a).await.unwrap().unwrap();
        assert_eq!(winner.games_played, 0);
    }

    #[tokio::test]
    async fn status_updates_are_compare_and_set() {
        let store = MemoryLeagueStore::new();
        let game = game(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        store.insert_game(game.clone()).await.unwrap();

        assert!(
            store
                .update_game_status(game.id, GameStatus::Pending, GameStatus::InProgress)
                .await
                .unwrap()
        );
        assert!(
            !store
                .update_game_status(game.id, GameStatus::Pending, GameStatus::InProgress)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn batch_insert_keeps_creation_order() {
        let store = MemoryLeagueStore::new();
        let competition = Uuid::new_v4();
        let games: Vec<_> = (0..5)
            .map(|_| game(competition, Uuid::new_v4(), Uuid::new_v4()))
            .collect();
        store.insert_games(games.clone()).await.unwrap();
        store.insert_games(Vec::new()).await.unwrap();

        let stored: Vec<_> = store
            .list_games(competition)
            .await
            .unwrap()
            .into_iter()
            .map(|game| game.id)
            .collect();
        let expected: Vec<_> = games.iter().map(|game| game.id).collect();
        assert_eq!(stored, expected);
    }
}
