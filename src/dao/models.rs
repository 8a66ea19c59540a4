use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::lifecycle::{CompetitionStatus, GameStatus};

/// Calendar dates are exchanged and persisted as `YYYY-MM-DD`.
pub static DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, DATE_FORMAT)
}

/// Role a user holds globally or inside a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Community administrator.
    Admin,
    /// Runs competitions.
    Organizer,
    /// Takes part in games.
    Player,
}

/// How a game was won; each kind has its own counter in the winner's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VictoryType {
    /// Plain domino.
    Simple,
    /// Won with a double.
    Carroca,
    /// Last tile playable on both ends.
    LaELo,
    /// Last tile is a double playable on both ends.
    Cruzada,
    /// Blocked game decided on points.
    Points,
    /// Opponents never scored.
    Buchuda,
    /// Comeback after conceding a buchuda.
    BuchudaRe,
}

/// Registered person, the `users` table of the original application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Global roles; freshly created players only hold [`UserRole::Player`].
    pub roles: Vec<UserRole>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// A group of players organising competitions together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub whatsapp_group_id: Option<String>,
    /// Player owning the community.
    pub admin_id: Uuid,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Membership of a player in a community, unique per `(community_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityMemberEntity {
    pub id: Uuid,
    pub community_id: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Named event within a community grouping games and stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionEntity {
    pub id: Uuid,
    pub community_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: CompetitionStatus,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Association of a player to a competition, created once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentEntity {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub player_id: Uuid,
    pub created_at: SystemTime,
}

/// A contest between two enrolled players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
    pub status: GameStatus,
    /// Set only once the game is finished; always one of the two participants.
    pub winner_id: Option<Uuid>,
    pub victory_type: Option<VictoryType>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// The other participant, or `None` when `player_id` does not play this game.
    pub fn opponent_of(&self, player_id: Uuid) -> Option<Uuid> {
        if self.player1_id == player_id {
            Some(self.player2_id)
        } else if self.player2_id == player_id {
            Some(self.player1_id)
        } else {
            None
        }
    }
}

/// Per victory type counters kept for the winner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VictoryCounters {
    pub simple: u32,
    pub carroca: u32,
    pub la_e_lo: u32,
    pub cruzada: u32,
    pub points: u32,
    pub buchuda: u32,
    pub buchuda_re: u32,
}

impl VictoryCounters {
    /// Bump the counter matching `kind`.
    pub fn record(&mut self, kind: VictoryType) {
        let counter = match kind {
            VictoryType::Simple => &mut self.simple,
            VictoryType::Carroca => &mut self.carroca,
            VictoryType::LaELo => &mut self.la_e_lo,
            VictoryType::Cruzada => &mut self.cruzada,
            VictoryType::Points => &mut self.points,
            VictoryType::Buchuda => &mut self.buchuda,
            VictoryType::BuchudaRe => &mut self.buchuda_re,
        };
        *counter += 1;
    }

    /// Sum of every victory counter.
    pub fn total(&self) -> u32 {
        self.simple
            + self.carroca
            + self.la_e_lo
            + self.cruzada
            + self.points
            + self.buchuda
            + self.buchuda_re
    }
}

/// Aggregate counters of one player within one competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatsEntity {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub player_id: Uuid,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub victories: VictoryCounters,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl PlayerStatsEntity {
    /// Zeroed row created alongside an enrollment.
    pub fn zeroed(competition_id: Uuid, player_id: Uuid, now: SystemTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            competition_id,
            player_id,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            victories: VictoryCounters::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply one increment in place.
    pub fn apply(&mut self, increment: &StatsIncrement, now: SystemTime) {
        self.games_played += 1;
        match increment {
            StatsIncrement::Win { victory_type } => {
                self.games_won += 1;
                if let Some(kind) = victory_type {
                    self.victories.record(*kind);
                }
            }
            StatsIncrement::Loss => self.games_lost += 1,
        }
        self.updated_at = now;
        debug_assert!(self.is_consistent());
    }

    /// `games_played = games_won + games_lost` and victory counters bounded by wins.
    pub fn is_consistent(&self) -> bool {
        self.games_played == self.games_won + self.games_lost
            && self.victories.total() <= self.games_won
    }
}

/// Counter update applied to one stats row. Both variants count one game played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsIncrement {
    Win { victory_type: Option<VictoryType> },
    Loss,
}

/// Unit of work that finishes a game and updates both participants' counters.
///
/// Stores apply it all-or-nothing: the game must still be unfinished and both
/// stats rows must exist at commit time, otherwise nothing is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResultCommit {
    pub game_id: Uuid,
    pub competition_id: Uuid,
    pub winner_id: Uuid,
    pub loser_id: Uuid,
    pub victory_type: Option<VictoryType>,
    pub finished_at: SystemTime,
}

impl GameResultCommit {
    /// Increment for the winner's row.
    pub fn winner_increment(&self) -> StatsIncrement {
        StatsIncrement::Win {
            victory_type: self.victory_type,
        }
    }

    /// Increment for the loser's row.
    pub fn loser_increment(&self) -> StatsIncrement {
        StatsIncrement::Loss
    }
}

/// Outcome of [`GameResultCommit`] as decided inside the storage unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Everything was written; carries the rows as they are after the commit.
    Applied {
        game: GameEntity,
        winner_stats: PlayerStatsEntity,
        loser_stats: PlayerStatsEntity,
    },
    /// The game disappeared before the commit.
    GameMissing,
    /// Another request finished the game first.
    AlreadyFinished,
    /// No stats row for this player in the game's competition.
    StatsMissing { player_id: Uuid },
}

impl VictoryType {
    /// Snake case name, also the counter field name in [`VictoryCounters`].
    pub fn as_str(self) -> &'static str {
        match self {
            VictoryType::Simple => "simple",
            VictoryType::Carroca => "carroca",
            VictoryType::LaELo => "la_e_lo",
            VictoryType::Cruzada => "cruzada",
            VictoryType::Points => "points",
            VictoryType::Buchuda => "buchuda",
            VictoryType::BuchudaRe => "buchuda_re",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_use_iso_calendar_format() {
        let date = parse_date("2024-03-09").unwrap();
        assert_eq!(format_date(date), "2024-03-09");
        assert!(parse_date("09/03/2024").is_err());
    }

    fn game(p1: Uuid, p2: Uuid) -> GameEntity {
        let now = SystemTime::now();
        GameEntity {
            id: Uuid::new_v4(),
            competition_id: Uuid::new_v4(),
            player1_id: p1,
            player2_id: p2,
            status: GameStatus::Pending,
            winner_id: None,
            victory_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn opponent_lookup() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let game = game(a, b);
        assert_eq!(game.opponent_of(a), Some(b));
        assert_eq!(game.opponent_of(b), Some(a));
        assert_eq!(game.opponent_of(Uuid::new_v4()), None);
    }

    #[test]
    fn increments_keep_rows_consistent() {
        let now = SystemTime::now();
        let mut stats = PlayerStatsEntity::zeroed(Uuid::new_v4(), Uuid::new_v4(), now);
        assert!(stats.is_consistent());

        stats.apply(
            &StatsIncrement::Win {
                victory_type: Some(VictoryType::Carroca),
            },
            now,
        );
        stats.apply(&StatsIncrement::Loss, now);
        stats.apply(&StatsIncrement::Win { victory_type: None }, now);

        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.games_won, 2);
        assert_eq!(stats.games_lost, 1);
        assert_eq!(stats.victories.carroca, 1);
        assert_eq!(stats.victories.total(), 1);
        assert!(stats.is_consistent());
    }
}
