use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{CommunityEntity, CommunityMemberEntity, UserRole},
    dto::{format_system_time, player::PlayerSummary, validation::validate_name},
};

/// Payload used to create a community owned by an existing player.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateCommunityRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 120))]
    pub whatsapp_group_id: Option<String>,
    pub admin_id: Uuid,
}

/// Partial update of a community; `null` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCommunityRequest {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub whatsapp_group_id: Option<Option<String>>,
}

impl Validate for UpdateCommunityRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            if let Err(e) = validate_name(name) {
                errors.add("name", e);
            }
        }

        if let Some(Some(ref description)) = self.description {
            if description.chars().count() > 500 {
                errors.add("description", validator::ValidationError::new("length"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Public projection of a community.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CommunitySummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub whatsapp_group_id: Option<String>,
    pub admin_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommunityEntity> for CommunitySummary {
    fn from(value: CommunityEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            whatsapp_group_id: value.whatsapp_group_id,
            admin_id: value.admin_id,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// Payload adding a player to a community.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    /// Defaults to `player`.
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// A membership joined with the member's profile.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MemberSummary {
    pub id: Uuid,
    pub community_id: Uuid,
    pub role: UserRole,
    pub joined_at: String,
    pub player: PlayerSummary,
}

impl MemberSummary {
    /// Join a membership row with its player.
    pub fn new(member: CommunityMemberEntity, player: PlayerSummary) -> Self {
        Self {
            id: member.id,
            community_id: member.community_id,
            role: member.role,
            joined_at: format_system_time(member.created_at),
            player,
        }
    }
}
