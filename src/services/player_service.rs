use std::time::SystemTime;

use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        league_store::LeagueStore,
        models::{PlayerEntity, UserRole},
    },
    dto::player::{CreatePlayerRequest, PlayerSummary, UpdatePlayerRequest},
    error::ServiceError,
    state::SharedState,
};

/// Register a new player holding the `player` role.
pub async fn create_player(
    state: &SharedState,
    request: CreatePlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;

    let now = SystemTime::now();
    let player = PlayerEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_owned(),
        nickname: request.nickname,
        phone: request.phone,
        email: request.email,
        roles: vec![UserRole::Player],
        created_at: now,
        updated_at: now,
    };
    store.save_player(player.clone()).await?;

    Ok(player.into())
}

/// Apply a partial profile update.
pub async fn update_player(
    state: &SharedState,
    id: Uuid,
    request: UpdatePlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;
    let mut player = load_player(store.as_ref(), id).await?;

    if let Some(name) = request.name {
        player.name = name.trim().to_owned();
    }
    if let Some(nickname) = request.nickname {
        player.nickname = nickname;
    }
    if let Some(phone) = request.phone {
        player.phone = phone;
    }
    if let Some(email) = request.email {
        player.email = email;
    }
    player.updated_at = SystemTime::now();
    store.save_player(player.clone()).await?;

    Ok(player.into())
}

/// Fetch one player.
pub async fn get_player(state: &SharedState, id: Uuid) -> Result<PlayerSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_player(store.as_ref(), id).await?.into())
}

/// All players ordered by name.
pub async fn list_players(state: &SharedState) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_store().await?;
    let players = store.list_players().await?;
    Ok(players.into_iter().map(Into::into).collect())
}

/// Load a player or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_player(
    store: &dyn LeagueStore,
    id: Uuid,
) -> Result<PlayerEntity, ServiceError> {
    store
        .find_player(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("player `{id}` not found")))
}
