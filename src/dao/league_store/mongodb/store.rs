use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::IndexOptions,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{
        COMMUNITIES, COMPETITIONS, CommunityDocument, CompetitionDocument, ENROLLMENTS,
        EnrollmentDocument, GAMES, GameDocument, MEMBERS, MemberDocument, PLAYER_STATS, PLAYERS,
        PlayerDocument, PlayerStatsDocument, doc_id, stats_increment, stats_key,
    },
};
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

/// MongoDB league store. Multi-document writes run inside transactions, which
/// requires the server to be a replica set member.
#[derive(Clone)]
pub struct MongoLeagueStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.state.read().await.database.clone();
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

async fn collect<D, E>(
    collection: &'static str,
    cursor: mongodb::Cursor<D>,
) -> MongoResult<Vec<E>>
where
    D: DeserializeOwned + Send + Sync + Unpin,
    E: TryFrom<D, Error = MongoDaoError>,
{
    let documents: Vec<D> = cursor
        .try_collect()
        .await
        .map_err(MongoDaoError::query(collection, "read cursor"))?;
    documents.into_iter().map(E::try_from).collect()
}

impl MongoLeagueStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let indexes: [(&'static str, &'static str, Document, bool); 6] = [
            (MEMBERS, "community_id,user_id", doc! {"community_id": 1, "user_id": 1}, true),
            (ENROLLMENTS, "competition_id,player_id", doc! {"competition_id": 1, "player_id": 1}, true),
            (PLAYER_STATS, "competition_id,player_id", doc! {"competition_id": 1, "player_id": 1}, true),
            (GAMES, "competition_id", doc! {"competition_id": 1, "created_at": 1}, false),
            (COMPETITIONS, "community_id", doc! {"community_id": 1, "created_at": -1}, false),
            (PLAYERS, "name", doc! {"name": 1}, false),
        ];

        for (collection, index, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{collection}_{}_idx", index.replace(',', "_"))))
                        .unique(Some(unique))
                        .build(),
                )
                .build();
            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }
        Ok(())
    }

    async fn database(&self) -> Database {
        self.inner.state.read().await.database.clone()
    }

    async fn client(&self) -> Client {
        self.inner.state.read().await.client.clone()
    }

    async fn collection<T: Send + Sync>(&self, name: &'static str) -> Collection<T> {
        self.database().await.collection::<T>(name)
    }

    async fn upsert<T>(&self, name: &'static str, id: Uuid, document: T) -> MongoResult<()>
    where
        T: Serialize + Send + Sync,
    {
        self.collection::<T>(name)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(MongoDaoError::query(name, "save document"))?;
        Ok(())
    }

    async fn find_by_id<D, E>(&self, name: &'static str, id: Uuid) -> MongoResult<Option<E>>
    where
        D: DeserializeOwned + Send + Sync,
        E: TryFrom<D, Error = MongoDaoError>,
    {
        self.collection::<D>(name)
            .await
            .find_one(doc_id(id))
            .await
            .map_err(MongoDaoError::query(name, "load document"))?
            .map(E::try_from)
            .transpose()
    }

    async fn find_many<D, E>(
        &self,
        name: &'static str,
        filter: Document,
        sort: Document,
    ) -> MongoResult<Vec<E>>
    where
        D: DeserializeOwned + Send + Sync + Unpin,
        E: TryFrom<D, Error = MongoDaoError>,
    {
        let cursor = self
            .collection::<D>(name)
            .await
            .find(filter)
            .sort(sort)
            .await
            .map_err(MongoDaoError::query(name, "list documents"))?;
        collect(name, cursor).await
    }

    async fn start_transaction(&self, operation: &'static str) -> MongoResult<ClientSession> {
        let mut session = self
            .client()
            .await
            .start_session()
            .await
            .map_err(MongoDaoError::transaction(operation, "start session"))?;
        session
            .start_transaction()
            .await
            .map_err(MongoDaoError::transaction(operation, "start transaction"))?;
        Ok(session)
    }

    /// Commit when `apply` is set and the unit of work succeeded, abort otherwise.
    async fn finish_transaction<T>(
        operation: &'static str,
        mut session: ClientSession,
        result: MongoResult<(T, bool)>,
    ) -> MongoResult<T> {
        match result {
            Ok((value, true)) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(MongoDaoError::transaction(operation, "commit"))?;
                Ok(value)
            }
            Ok((value, false)) => {
                session
                    .abort_transaction()
                    .await
                    .map_err(MongoDaoError::transaction(operation, "abort"))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    tracing::warn!(operation, error = %abort_err, "failed to abort transaction");
                }
                Err(err)
            }
        }
    }

    async fn delete_community(&self, id: Uuid) -> MongoResult<bool> {
        const OP: &str = "deleting community";
        let database = self.database().await;
        let mut session = self.start_transaction(OP).await?;
        let result: MongoResult<(bool, bool)> = async {
            let deleted = database
                .collection::<Document>(COMMUNITIES)
                .delete_one(doc_id(id))
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "delete community"))?;
            if deleted.deleted_count == 0 {
                return Ok((false, false));
            }
            database
                .collection::<Document>(MEMBERS)
                .delete_many(doc! {"community_id": id.to_string()})
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "delete members"))?;
            Ok((true, true))
        }
        .await;
        Self::finish_transaction(OP, session, result).await
    }

    /// The unique `(community_id, user_id)` index rejects a concurrent duplicate.
    async fn insert_member(&self, member: CommunityMemberEntity) -> MongoResult<bool> {
        let collection = self.collection::<MemberDocument>(MEMBERS).await;
        let existing = collection
            .count_documents(doc! {
                "community_id": member.community_id.to_string(),
                "user_id": member.user_id.to_string(),
            })
            .await
            .map_err(MongoDaoError::query(MEMBERS, "check member"))?;
        if existing > 0 {
            return Ok(false);
        }
        match collection.insert_one(MemberDocument::from(member)).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(MongoDaoError::query(MEMBERS, "insert member")(err)),
        }
    }

    async fn delete_member(&self, community_id: Uuid, user_id: Uuid) -> MongoResult<bool> {
        let result = self
            .collection::<Document>(MEMBERS)
            .await
            .delete_one(doc! {"community_id": community_id.to_string(), "user_id": user_id.to_string()})
            .await
            .map_err(MongoDaoError::query(MEMBERS, "delete member"))?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_competition(&self, id: Uuid) -> MongoResult<bool> {
        const OP: &str = "deleting competition";
        let database = self.database().await;
        let mut session = self.start_transaction(OP).await?;
        let result: MongoResult<(bool, bool)> = async {
            let deleted = database
                .collection::<Document>(COMPETITIONS)
                .delete_one(doc_id(id))
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "delete competition"))?;
            if deleted.deleted_count == 0 {
                return Ok((false, false));
            }
            for collection in [ENROLLMENTS, PLAYER_STATS] {
                database
                    .collection::<Document>(collection)
                    .delete_many(doc! {"competition_id": id.to_string()})
                    .session(&mut session)
                    .await
                    .map_err(MongoDaoError::transaction(OP, "delete dependent rows"))?;
            }
            Ok((true, true))
        }
        .await;
        Self::finish_transaction(OP, session, result).await
    }

    async fn compare_and_set_status(
        &self,
        name: &'static str,
        id: Uuid,
        from: &'static str,
        to: &'static str,
    ) -> MongoResult<bool> {
        let result = self
            .collection::<Document>(name)
            .await
            .update_one(
                doc! {"_id": id.to_string(), "status": from},
                doc! {"$set": {"status": to, "updated_at": DateTime::now()}},
            )
            .await
            .map_err(MongoDaoError::query(name, "update status"))?;
        Ok(result.modified_count == 1)
    }

    async fn enroll_player(
        &self,
        enrollment: EnrollmentEntity,
        stats: PlayerStatsEntity,
    ) -> MongoResult<bool> {
        const OP: &str = "enrolling player";
        let database = self.database().await;
        let key = stats_key(enrollment.competition_id, enrollment.player_id);
        let mut session = self.start_transaction(OP).await?;
        let result: MongoResult<(bool, bool)> = async {
            let existing = database
                .collection::<Document>(ENROLLMENTS)
                .count_documents(key.clone())
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "check enrollment"))?;
            if existing > 0 {
                return Ok((false, false));
            }
            database
                .collection::<EnrollmentDocument>(ENROLLMENTS)
                .insert_one(EnrollmentDocument::from(enrollment))
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "insert enrollment"))?;

            let stats_rows = database.collection::<PlayerStatsDocument>(PLAYER_STATS);
            let has_stats = stats_rows
                .count_documents(key.clone())
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "check stats"))?;
            if has_stats == 0 {
                stats_rows
                    .insert_one(PlayerStatsDocument::from(stats))
                    .session(&mut session)
                    .await
                    .map_err(MongoDaoError::transaction(OP, "insert stats"))?;
            }
            Ok((true, true))
        }
        .await;
        Self::finish_transaction(OP, session, result).await
    }

    async fn insert_games(&self, games: Vec<GameEntity>) -> MongoResult<()> {
        const OP: &str = "inserting games";
        if games.is_empty() {
            return Ok(());
        }
        let database = self.database().await;
        let mut session = self.start_transaction(OP).await?;
        let result: MongoResult<((), bool)> = async {
            database
                .collection::<GameDocument>(GAMES)
                .insert_many(games.into_iter().map(GameDocument::from))
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "insert games"))?;
            Ok(((), true))
        }
        .await;
        Self::finish_transaction(OP, session, result).await
    }

    async fn find_player_stats(
        &self,
        competition_id: Uuid,
        player_id: Uuid,
    ) -> MongoResult<Option<PlayerStatsEntity>> {
        self.collection::<PlayerStatsDocument>(PLAYER_STATS)
            .await
            .find_one(stats_key(competition_id, player_id))
            .await
            .map_err(MongoDaoError::query(PLAYER_STATS, "load stats"))?
            .map(PlayerStatsEntity::try_from)
            .transpose()
    }

    async fn commit_game_result(&self, commit: GameResultCommit) -> MongoResult<CommitOutcome> {
        const OP: &str = "recording game result";
        let database = self.database().await;
        let games = database.collection::<GameDocument>(GAMES);
        let stats = database.collection::<PlayerStatsDocument>(PLAYER_STATS);
        let mut session = self.start_transaction(OP).await?;

        let result: MongoResult<(CommitOutcome, bool)> = async {
            let Some(game) = games
                .find_one(doc_id(commit.game_id))
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "load game"))?
            else {
                return Ok((CommitOutcome::GameMissing, false));
            };
            let game = GameEntity::try_from(game)?;
            if game.status.is_finished() {
                return Ok((CommitOutcome::AlreadyFinished, false));
            }

            for player_id in [commit.winner_id, commit.loser_id] {
                let present = stats
                    .count_documents(stats_key(game.competition_id, player_id))
                    .session(&mut session)
                    .await
                    .map_err(MongoDaoError::transaction(OP, "check stats"))?;
                if present == 0 {
                    return Ok((CommitOutcome::StatsMissing { player_id }, false));
                }
            }

            let now = DateTime::from_system_time(commit.finished_at);
            let updated = games
                .update_one(
                    doc! {"_id": commit.game_id.to_string(), "status": {"$ne": GameStatus::Finished.as_str()}},
                    doc! {"$set": {
                        "status": GameStatus::Finished.as_str(),
                        "winner_id": commit.winner_id.to_string(),
                        "victory_type": commit.victory_type.map(|kind| kind.as_str()),
                        "updated_at": now,
                    }},
                )
                .session(&mut session)
                .await
                .map_err(MongoDaoError::transaction(OP, "finish game"))?;
            if updated.matched_count == 0 {
                return Ok((CommitOutcome::AlreadyFinished, false));
            }

            let mut rows = Vec::with_capacity(2);
            for (player_id, won) in [(commit.winner_id, true), (commit.loser_id, false)] {
                let key = stats_key(game.competition_id, player_id);
                let bumped = stats
                    .update_one(key.clone(), stats_increment(won, commit.victory_type, now))
                    .session(&mut session)
                    .await
                    .map_err(MongoDaoError::transaction(OP, "increment stats"))?;
                if bumped.matched_count != 1 {
                    return Err(MongoDaoError::StatsVanished { player_id });
                }
                let row = stats
                    .find_one(key)
                    .session(&mut session)
                    .await
                    .map_err(MongoDaoError::transaction(OP, "reload stats"))?
                    .ok_or(MongoDaoError::StatsVanished { player_id })?;
                rows.push(PlayerStatsEntity::try_from(row)?);
            }

            let game = GameEntity {
                status: GameStatus::Finished,
                winner_id: Some(commit.winner_id),
                victory_type: commit.victory_type,
                updated_at: commit.finished_at,
                ..game
            };
            let loser_stats = rows.pop().ok_or(MongoDaoError::StatsVanished {
                player_id: commit.loser_id,
            })?;
            let winner_stats = rows.pop().ok_or(MongoDaoError::StatsVanished {
                player_id: commit.winner_id,
            })?;
            Ok((
                CommitOutcome::Applied {
                    game,
                    winner_stats,
                    loser_stats,
                },
                true,
            ))
        }
        .await;

        Self::finish_transaction(OP, session, result).await
    }
}

impl LeagueStore for MongoLeagueStore {
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = player.id;
            store
                .upsert(PLAYERS, id, PlayerDocument::from(player))
                .await
                .map_err(Into::into)
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<PlayerDocument, _>(PLAYERS, id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<PlayerDocument, _>(PLAYERS, doc! {}, doc! {"name": 1})
                .await
                .map_err(Into::into)
        })
    }

    fn save_community(
        &self,
        community: CommunityEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = community.id;
            store
                .upsert(COMMUNITIES, id, CommunityDocument::from(community))
                .await
                .map_err(Into::into)
        })
    }

    fn find_community(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CommunityEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<CommunityDocument, _>(COMMUNITIES, id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_communities(&self) -> BoxFuture<'static, StorageResult<Vec<CommunityEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<CommunityDocument, _>(COMMUNITIES, doc! {}, doc! {"created_at": -1})
                .await
                .map_err(Into::into)
        })
    }

    fn delete_community(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_community(id).await.map_err(Into::into) })
    }

    fn insert_member(
        &self,
        member: CommunityMemberEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.insert_member(member).await.map_err(Into::into) })
    }

    fn delete_member(
        &self,
        community_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_member(community_id, user_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_members(
        &self,
        community_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CommunityMemberEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<MemberDocument, _>(
                    MEMBERS,
                    doc! {"community_id": community_id.to_string()},
                    doc! {"created_at": 1},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn save_competition(
        &self,
        competition: CompetitionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = competition.id;
            store
                .upsert(COMPETITIONS, id, CompetitionDocument::from(competition))
                .await
                .map_err(Into::into)
        })
    }

    fn find_competition(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<CompetitionDocument, _>(COMPETITIONS, id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_competitions(
        &self,
        community_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<CompetitionDocument, _>(
                    COMPETITIONS,
                    doc! {"community_id": community_id.to_string()},
                    doc! {"created_at": -1},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn delete_competition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_competition(id).await.map_err(Into::into) })
    }

    fn update_competition_status(
        &self,
        id: Uuid,
        from: CompetitionStatus,
        to: CompetitionStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .compare_and_set_status(COMPETITIONS, id, from.as_str(), to.as_str())
                .await
                .map_err(Into::into)
        })
    }

    fn enroll_player(
        &self,
        enrollment: EnrollmentEntity,
        stats: PlayerStatsEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .enroll_player(enrollment, stats)
                .await
                .map_err(Into::into)
        })
    }

    fn list_enrollments(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrollmentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<EnrollmentDocument, _>(
                    ENROLLMENTS,
                    doc! {"competition_id": competition_id.to_string()},
                    doc! {"created_at": 1},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = game.id;
            store
                .upsert(GAMES, id, GameDocument::from(game))
                .await
                .map_err(Into::into)
        })
    }

    fn insert_games(&self, games: Vec<GameEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_games(games).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_by_id::<GameDocument, _>(GAMES, id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_games(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<GameDocument, _>(
                    GAMES,
                    doc! {"competition_id": competition_id.to_string()},
                    doc! {"created_at": 1},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn update_game_status(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .compare_and_set_status(GAMES, id, from.as_str(), to.as_str())
                .await
                .map_err(Into::into)
        })
    }

    fn find_player_stats(
        &self,
        competition_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerStatsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_player_stats(competition_id, player_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_player_stats(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerStatsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many::<PlayerStatsDocument, _>(
                    PLAYER_STATS,
                    doc! {"competition_id": competition_id.to_string()},
                    doc! {"created_at": 1},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn commit_game_result(
        &self,
        commit: GameResultCommit,
    ) -> BoxFuture<'static, StorageResult<CommitOutcome>> {
        let store = self.clone();
        Box::pin(async move { store.commit_game_result(commit).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
