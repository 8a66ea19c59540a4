use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    dao::models::{GameEntity, VictoryType},
    dto::{format_system_time, stats::PlayerStatsSummary},
    state::lifecycle::GameStatus,
};

/// Payload creating a game between two enrolled players.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_distinct_players"))]
pub struct CreateGameRequest {
    pub player1_id: Uuid,
    pub player2_id: Uuid,
}

fn validate_distinct_players(request: &CreateGameRequest) -> Result<(), ValidationError> {
    if request.player1_id == request.player2_id {
        let mut err = ValidationError::new("same_player");
        err.message = Some("A game needs two distinct players".into());
        return Err(err);
    }
    Ok(())
}

/// Payload recording the outcome of a game.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct RecordResultRequest {
    pub winner_id: Uuid,
    #[serde(default)]
    pub victory_type: Option<VictoryType>,
}

/// Public projection of a game.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
    pub status: GameStatus,
    pub winner_id: Option<Uuid>,
    pub victory_type: Option<VictoryType>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameEntity> for GameSummary {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            competition_id: value.competition_id,
            player1_id: value.player1_id,
            player2_id: value.player2_id,
            status: value.status,
            winner_id: value.winner_id,
            victory_type: value.victory_type,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// The finished game together with both participants' updated counters.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct GameResultResponse {
    pub game: GameSummary,
    pub winner_stats: PlayerStatsSummary,
    pub loser_stats: PlayerStatsSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_game_rejects_self_match() {
        let id = Uuid::new_v4();
        let request = CreateGameRequest {
            player1_id: id,
            player2_id: id,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn victory_type_uses_snake_case() {
        let request: RecordResultRequest = serde_json::from_str(&format!(
            r#"{{"winner_id": "{}", "victory_type": "la_e_lo"}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert_eq!(request.victory_type, Some(VictoryType::LaELo));
    }
}
