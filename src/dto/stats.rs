use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{PlayerStatsEntity, VictoryCounters},
    dto::format_system_time,
};

/// Counters of one player within one competition.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlayerStatsSummary {
    pub competition_id: Uuid,
    pub player_id: Uuid,
    /// Filled in standings; omitted when the player profile is unknown.
    pub player_name: Option<String>,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub victories: VictoryCounters,
    pub updated_at: String,
}

impl PlayerStatsSummary {
    /// Attach the player's display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = Some(name.into());
        self
    }
}

impl From<PlayerStatsEntity> for PlayerStatsSummary {
    fn from(value: PlayerStatsEntity) -> Self {
        Self {
            competition_id: value.competition_id,
            player_id: value.player_id,
            player_name: None,
            games_played: value.games_played,
            games_won: value.games_won,
            games_lost: value.games_lost,
            victories: value.victories,
            updated_at: format_system_time(value.updated_at),
        }
    }
}
