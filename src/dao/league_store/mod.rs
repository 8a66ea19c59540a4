pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    CommitOutcome, CommunityEntity, CommunityMemberEntity, CompetitionEntity, EnrollmentEntity,
    GameEntity, GameResultCommit, PlayerEntity, PlayerStatsEntity,
};
use crate::dao::storage::StorageResult;
use crate::state::lifecycle::{CompetitionStatus, GameStatus};
use futures::future::BoxFuture;
use uuid::Uuid;

pub use memory::MemoryLeagueStore;

/// Abstraction over the persistence layer for the league data.
///
/// Status updates are compare-and-set: they only apply when the stored status still
/// equals `from` and report whether they did. [`LeagueStore::enroll_player`] and
/// [`LeagueStore::commit_game_result`] are atomic units of work.
pub trait LeagueStore: Send + Sync {
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Players ordered by name.
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;

    fn save_community(&self, community: CommunityEntity)
    -> BoxFuture<'static, StorageResult<()>>;
    fn find_community(&self, id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<CommunityEntity>>>;
    /// Communities, newest first.
    fn list_communities(&self) -> BoxFuture<'static, StorageResult<Vec<CommunityEntity>>>;
    /// Delete a community together with its memberships.
    fn delete_community(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert a membership; `false` when the user already belongs to the community.
    fn insert_member(
        &self,
        member: CommunityMemberEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn delete_member(
        &self,
        community_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn list_members(
        &self,
        community_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CommunityMemberEntity>>>;

    fn save_competition(
        &self,
        competition: CompetitionEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_competition(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>>;
    /// Competitions of a community, newest first.
    fn list_competitions(
        &self,
        community_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>>;
    /// Delete a competition together with its enrollments and stats rows.
    fn delete_competition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn update_competition_status(
        &self,
        id: Uuid,
        from: CompetitionStatus,
        to: CompetitionStatus,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Atomically insert the enrollment and its zeroed stats row.
    ///
    /// Returns `false` without writing anything when the player is already enrolled.
    fn enroll_player(
        &self,
        enrollment: EnrollmentEntity,
        stats: PlayerStatsEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Enrollments of a competition in enrollment order.
    fn list_enrollments(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrollmentEntity>>>;

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert every game or none.
    fn insert_games(&self, games: Vec<GameEntity>) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Games of a competition in creation order.
    fn list_games(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn update_game_status(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    fn find_player_stats(
        &self,
        competition_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerStatsEntity>>>;
    fn list_player_stats(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerStatsEntity>>>;
    /// Finish the game and increment both stats rows as one unit of work.
    fn commit_game_result(
        &self,
        commit: GameResultCommit,
    ) -> BoxFuture<'static, StorageResult<CommitOutcome>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
