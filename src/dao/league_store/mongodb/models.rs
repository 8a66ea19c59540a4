use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::{
    dao::models::{
        CommunityEntity, CommunityMemberEntity, CompetitionEntity, EnrollmentEntity, GameEntity,
        PlayerEntity, PlayerStatsEntity, UserRole, VictoryCounters, VictoryType, format_date,
        parse_date,
    },
    state::lifecycle::{CompetitionStatus, GameStatus},
};

pub const PLAYERS: &str = "players";
pub const COMMUNITIES: &str = "communities";
pub const MEMBERS: &str = "community_members";
pub const COMPETITIONS: &str = "competitions";
pub const ENROLLMENTS: &str = "enrollments";
pub const GAMES: &str = "games";
pub const PLAYER_STATS: &str = "player_stats";

/// Identifiers are persisted as their hyphenated string form.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

fn parse_id(collection: &'static str, raw: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(raw).map_err(|err| MongoDaoError::decode(collection, raw, err))
}

fn counter(collection: &'static str, id: &str, value: i64) -> MongoResult<u32> {
    u32::try_from(value)
        .map_err(|_| MongoDaoError::decode(collection, id, format!("counter out of range: {value}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    nickname: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    #[serde(default)]
    roles: Vec<UserRole>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<PlayerEntity> for PlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            nickname: value.nickname,
            phone: value.phone,
            email: value.email,
            roles: value.roles,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<PlayerDocument> for PlayerEntity {
    type Error = MongoDaoError;

    fn try_from(value: PlayerDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(PLAYERS, &value.id)?,
            name: value.name,
            nickname: value.nickname,
            phone: value.phone,
            email: value.email,
            roles: value.roles,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    description: Option<String>,
    whatsapp_group_id: Option<String>,
    admin_id: String,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<CommunityEntity> for CommunityDocument {
    fn from(value: CommunityEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            whatsapp_group_id: value.whatsapp_group_id,
            admin_id: value.admin_id.to_string(),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<CommunityDocument> for CommunityEntity {
    type Error = MongoDaoError;

    fn try_from(value: CommunityDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(COMMUNITIES, &value.id)?,
            name: value.name,
            description: value.description,
            whatsapp_group_id: value.whatsapp_group_id,
            admin_id: parse_id(COMMUNITIES, &value.admin_id)?,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDocument {
    #[serde(rename = "_id")]
    id: String,
    community_id: String,
    user_id: String,
    role: UserRole,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<CommunityMemberEntity> for MemberDocument {
    fn from(value: CommunityMemberEntity) -> Self {
        Self {
            id: value.id.to_string(),
            community_id: value.community_id.to_string(),
            user_id: value.user_id.to_string(),
            role: value.role,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MemberDocument> for CommunityMemberEntity {
    type Error = MongoDaoError;

    fn try_from(value: MemberDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(MEMBERS, &value.id)?,
            community_id: parse_id(MEMBERS, &value.community_id)?,
            user_id: parse_id(MEMBERS, &value.user_id)?,
            role: value.role,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionDocument {
    #[serde(rename = "_id")]
    id: String,
    community_id: String,
    name: String,
    description: Option<String>,
    status: CompetitionStatus,
    start_date: Option<String>,
    end_date: Option<String>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<CompetitionEntity> for CompetitionDocument {
    fn from(value: CompetitionEntity) -> Self {
        Self {
            id: value.id.to_string(),
            community_id: value.community_id.to_string(),
            name: value.name,
            description: value.description,
            status: value.status,
            start_date: value.start_date.map(format_date),
            end_date: value.end_date.map(format_date),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<CompetitionDocument> for CompetitionEntity {
    type Error = MongoDaoError;

    fn try_from(value: CompetitionDocument) -> MongoResult<Self> {
        let date = |raw: Option<String>| {
            raw.map(|raw| {
                parse_date(&raw).map_err(|err| MongoDaoError::decode(COMPETITIONS, &value.id, err))
            })
            .transpose()
        };
        let start_date = date(value.start_date.clone())?;
        let end_date = date(value.end_date.clone())?;

        Ok(Self {
            id: parse_id(COMPETITIONS, &value.id)?,
            community_id: parse_id(COMPETITIONS, &value.community_id)?,
            name: value.name,
            description: value.description,
            status: value.status,
            start_date,
            end_date,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentDocument {
    #[serde(rename = "_id")]
    id: String,
    competition_id: String,
    player_id: String,
    created_at: DateTime,
}

impl From<EnrollmentEntity> for EnrollmentDocument {
    fn from(value: EnrollmentEntity) -> Self {
        Self {
            id: value.id.to_string(),
            competition_id: value.competition_id.to_string(),
            player_id: value.player_id.to_string(),
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<EnrollmentDocument> for EnrollmentEntity {
    type Error = MongoDaoError;

    fn try_from(value: EnrollmentDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(ENROLLMENTS, &value.id)?,
            competition_id: parse_id(ENROLLMENTS, &value.competition_id)?,
            player_id: parse_id(ENROLLMENTS, &value.player_id)?,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDocument {
    #[serde(rename = "_id")]
    id: String,
    competition_id: String,
    player1_id: String,
    player2_id: String,
    status: GameStatus,
    winner_id: Option<String>,
    victory_type: Option<VictoryType>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for GameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            competition_id: value.competition_id.to_string(),
            player1_id: value.player1_id.to_string(),
            player2_id: value.player2_id.to_string(),
            status: value.status,
            winner_id: value.winner_id.map(|id| id.to_string()),
            victory_type: value.victory_type,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<GameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: GameDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(GAMES, &value.id)?,
            competition_id: parse_id(GAMES, &value.competition_id)?,
            player1_id: parse_id(GAMES, &value.player1_id)?,
            player2_id: parse_id(GAMES, &value.player2_id)?,
            status: value.status,
            winner_id: value
                .winner_id
                .as_deref()
                .map(|raw| parse_id(GAMES, raw))
                .transpose()?,
            victory_type: value.victory_type,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// Counters are stored as 64-bit integers so `$inc` never changes their BSON type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VictoryCountersDocument {
    simple: i64,
    carroca: i64,
    la_e_lo: i64,
    cruzada: i64,
    points: i64,
    buchuda: i64,
    buchuda_re: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatsDocument {
    #[serde(rename = "_id")]
    id: String,
    competition_id: String,
    player_id: String,
    games_played: i64,
    games_won: i64,
    games_lost: i64,
    #[serde(default)]
    victories: VictoryCountersDocument,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<PlayerStatsEntity> for PlayerStatsDocument {
    fn from(value: PlayerStatsEntity) -> Self {
        let v = value.victories;
        Self {
            id: value.id.to_string(),
            competition_id: value.competition_id.to_string(),
            player_id: value.player_id.to_string(),
            games_played: value.games_played.into(),
            games_won: value.games_won.into(),
            games_lost: value.games_lost.into(),
            victories: VictoryCountersDocument {
                simple: v.simple.into(),
                carroca: v.carroca.into(),
                la_e_lo: v.la_e_lo.into(),
                cruzada: v.cruzada.into(),
                points: v.points.into(),
                buchuda: v.buchuda.into(),
                buchuda_re: v.buchuda_re.into(),
            },
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<PlayerStatsDocument> for PlayerStatsEntity {
    type Error = MongoDaoError;

    fn try_from(value: PlayerStatsDocument) -> MongoResult<Self> {
        let id = value.id.as_str();
        let c = |raw| counter(PLAYER_STATS, id, raw);
        let v = &value.victories;
        Ok(Self {
            id: parse_id(PLAYER_STATS, id)?,
            competition_id: parse_id(PLAYER_STATS, &value.competition_id)?,
            player_id: parse_id(PLAYER_STATS, &value.player_id)?,
            games_played: c(value.games_played)?,
            games_won: c(value.games_won)?,
            games_lost: c(value.games_lost)?,
            victories: VictoryCounters {
                simple: c(v.simple)?,
                carroca: c(v.carroca)?,
                la_e_lo: c(v.la_e_lo)?,
                cruzada: c(v.cruzada)?,
                points: c(v.points)?,
                buchuda: c(v.buchuda)?,
                buchuda_re: c(v.buchuda_re)?,
            },
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// `$inc`/`$set` update for one stats row.
pub fn stats_increment(won: bool, victory_type: Option<VictoryType>, now: DateTime) -> Document {
    let mut inc = doc! {"games_played": 1_i64};
    if won {
        inc.insert("games_won", 1_i64);
        if let Some(kind) = victory_type {
            inc.insert(format!("victories.{}", kind.as_str()), 1_i64);
        }
    } else {
        inc.insert("games_lost", 1_i64);
    }
    doc! {"$inc": inc, "$set": {"updated_at": now}}
}

/// Filter matching the stats row of `player_id` in `competition_id`.
pub fn stats_key(competition_id: Uuid, player_id: Uuid) -> Document {
    doc! {"competition_id": competition_id.to_string(), "player_id": player_id.to_string()}
}
