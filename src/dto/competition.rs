use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{CompetitionEntity, format_date},
    dto::{
        format_system_time,
        game::GameSummary,
        player::PlayerSummary,
        validation::{validate_date, validate_name},
    },
    state::lifecycle::CompetitionStatus,
};

/// Payload used to create a competition inside a community.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateCompetitionRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// `YYYY-MM-DD`.
    #[validate(custom(function = "validate_date"))]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, not before `start_date`.
    #[validate(custom(function = "validate_date"))]
    pub end_date: Option<String>,
}

/// Metadata edit of a competition; `null` clears an optional field.
///
/// The status is not editable here; use the start and finish operations.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCompetitionRequest {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub start_date: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<Option<String>>,
}

impl Validate for UpdateCompetitionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            if let Err(e) = validate_name(name) {
                errors.add("name", e);
            }
        }

        if let Some(Some(ref date)) = self.start_date {
            if let Err(e) = validate_date(date) {
                errors.add("start_date", e);
            }
        }

        if let Some(Some(ref date)) = self.end_date {
            if let Err(e) = validate_date(date) {
                errors.add("end_date", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Public projection of a competition.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CompetitionSummary {
    pub id: Uuid,
    pub community_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: CompetitionStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CompetitionEntity> for CompetitionSummary {
    fn from(value: CompetitionEntity) -> Self {
        Self {
            id: value.id,
            community_id: value.community_id,
            name: value.name,
            description: value.description,
            status: value.status,
            start_date: value.start_date.map(format_date),
            end_date: value.end_date.map(format_date),
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// Payload enrolling a player in a competition.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct EnrollPlayerRequest {
    pub player_id: Uuid,
}

/// Outcome of an enrollment; `created` is false when the player was already enrolled.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub competition_id: Uuid,
    pub player_id: Uuid,
    pub created: bool,
}

/// Enrolled player with the enrollment timestamp.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct EnrolledPlayer {
    pub enrolled_at: String,
    pub player: PlayerSummary,
}

impl EnrolledPlayer {
    /// Pair a player with the time of enrollment.
    pub fn new(enrolled_at: std::time::SystemTime, player: PlayerSummary) -> Self {
        Self {
            enrolled_at: format_system_time(enrolled_at),
            player,
        }
    }
}

/// Games created by a round-robin scheduling request.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub created: Vec<GameSummary>,
}
