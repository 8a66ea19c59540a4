use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{PlayerEntity, UserRole},
    dto::{
        format_system_time,
        validation::{validate_name, validate_phone},
    },
};

/// Payload used to register a new player.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreatePlayerRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(length(max = 60))]
    pub nickname: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Partial update of a player profile.
///
/// Optional text fields are tri-state: absent keeps the value, `null` clears it, a string
/// replaces it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub nickname: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
}

impl Validate for UpdatePlayerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            if let Err(e) = validate_name(name) {
                errors.add("name", e);
            }
        }

        if let Some(Some(ref phone)) = self.phone {
            if let Err(e) = validate_phone(phone) {
                errors.add("phone", e);
            }
        }

        if let Some(Some(ref email)) = self.email {
            if !validator::ValidateEmail::validate_email(email) {
                errors.add("email", validator::ValidationError::new("email"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Public projection of a player.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<UserRole>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            nickname: value.nickname,
            phone: value.phone,
            email: value.email,
            roles: value.roles,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_missing_from_null() {
        let request: UpdatePlayerRequest =
            serde_json::from_str(r#"{"nickname": null, "phone": "+53 555 1234"}"#).unwrap();
        assert_eq!(request.nickname, Some(None));
        assert_eq!(request.phone, Some(Some("+53 555 1234".into())));
        assert_eq!(request.email, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn update_rejects_blank_name_and_bad_email() {
        let request: UpdatePlayerRequest =
            serde_json::from_str(r#"{"name": " ", "email": "nope"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn create_request_validates_fields() {
        let request = CreatePlayerRequest {
            name: "Ana".into(),
            nickname: None,
            phone: Some("12".into()),
            email: Some("ana@example.com".into()),
        };
        assert!(request.validate().is_err());
    }
}
