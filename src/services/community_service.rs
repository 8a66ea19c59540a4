use std::{collections::HashSet, time::SystemTime};

use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        league_store::LeagueStore,
        models::{CommunityEntity, CommunityMemberEntity, UserRole},
    },
    dto::{
        community::{
            AddMemberRequest, CommunitySummary, CreateCommunityRequest, MemberSummary,
            UpdateCommunityRequest,
        },
        player::PlayerSummary,
    },
    error::ServiceError,
    services::player_service::load_player,
    state::SharedState,
};

/// Create a community owned by a registered player.
pub async fn create_community(
    state: &SharedState,
    request: CreateCommunityRequest,
) -> Result<CommunitySummary, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;
    load_player(store.as_ref(), request.admin_id).await?;

    let now = SystemTime::now();
    let community = CommunityEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_owned(),
        description: request.description,
        whatsapp_group_id: request.whatsapp_group_id,
        admin_id: request.admin_id,
        created_at: now,
        updated_at: now,
    };
    store.save_community(community.clone()).await?;

    Ok(community.into())
}

/// Apply a partial update to a community's metadata.
pub async fn update_community(
    state: &SharedState,
    id: Uuid,
    request: UpdateCommunityRequest,
) -> Result<CommunitySummary, ServiceError> {
    request.validate()?;
    let store = state.require_store().await?;
    let mut community = load_community(store.as_ref(), id).await?;

    if let Some(name) = request.name {
        community.name = name.trim().to_owned();
    }
    if let Some(description) = request.description {
        community.description = description;
    }
    if let Some(group) = request.whatsapp_group_id {
        community.whatsapp_group_id = group;
    }
    community.updated_at = SystemTime::now();
    store.save_community(community.clone()).await?;

    Ok(community.into())
}

/// Delete a community and its memberships; refused while it still owns competitions.
/// Runs under the lifecycle gate so no competition can be created in between.
pub async fn delete_community(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;

    state
        .run_gated("delete_community", || async move {
            load_community(store.as_ref(), id).await?;

            let competitions = store.list_competitions(id).await?;
            if !competitions.is_empty() {
                return Err(ServiceError::InvalidState(format!(
                    "community `{id}` still has {} competition(s)",
                    competitions.len()
                )));
            }

            if !store.delete_community(id).await? {
                return Err(ServiceError::NotFound(format!("community `{id}` not found")));
            }
            Ok(())
        })
        .await
}

/// Fetch one community.
pub async fn get_community(
    state: &SharedState,
    id: Uuid,
) -> Result<CommunitySummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_community(store.as_ref(), id).await?.into())
}

/// All communities, newest first.
pub async fn list_communities(state: &SharedState) -> Result<Vec<CommunitySummary>, ServiceError> {
    let store = state.require_store().await?;
    let communities = store.list_communities().await?;
    Ok(communities.into_iter().map(Into::into).collect())
}

/// Add a registered player to a community.
pub async fn add_member(
    state: &SharedState,
    community_id: Uuid,
    request: AddMemberRequest,
) -> Result<MemberSummary, ServiceError> {
    let store = state.require_store().await?;
    load_community(store.as_ref(), community_id).await?;
    let player = load_player(store.as_ref(), request.user_id).await?;

    let now = SystemTime::now();
    let member = CommunityMemberEntity {
        id: Uuid::new_v4(),
        community_id,
        user_id: player.id,
        role: request.role.unwrap_or(UserRole::Player),
        created_at: now,
        updated_at: now,
    };
    if !store.insert_member(member.clone()).await? {
        return Err(ServiceError::InvalidState(format!(
            "player `{}` is already a member of community `{community_id}`",
            player.id
        )));
    }

    Ok(MemberSummary::new(member, player.into()))
}

/// Remove a player from a community.
pub async fn remove_member(
    state: &SharedState,
    community_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !store.delete_member(community_id, user_id).await? {
        return Err(ServiceError::NotFound(format!(
            "player `{user_id}` is not a member of community `{community_id}`"
        )));
    }
    Ok(())
}

/// Memberships of a community joined with their player profiles.
pub async fn list_members(
    state: &SharedState,
    community_id: Uuid,
) -> Result<Vec<MemberSummary>, ServiceError> {
    let store = state.require_store().await?;
    load_community(store.as_ref(), community_id).await?;

    let mut members = Vec::new();
    for member in store.list_members(community_id).await? {
        match store.find_player(member.user_id).await? {
            Some(player) => members.push(MemberSummary::new(member, player.into())),
            None => tracing::warn!(
                community_id = %community_id,
                user_id = %member.user_id,
                "membership references a missing player"
            ),
        }
    }
    Ok(members)
}

/// Registered players that are not yet members of the community.
pub async fn list_available_players(
    state: &SharedState,
    community_id: Uuid,
) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_store().await?;
    load_community(store.as_ref(), community_id).await?;

    let members: HashSet<Uuid> = store
        .list_members(community_id)
        .await?
        .into_iter()
        .map(|member| member.user_id)
        .collect();

    Ok(store
        .list_players()
        .await?
        .into_iter()
        .filter(|player| !members.contains(&player.id))
        .map(Into::into)
        .collect())
}

/// Load a community or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_community(
    store: &dyn LeagueStore,
    id: Uuid,
) -> Result<CommunityEntity, ServiceError> {
    store
        .find_community(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("community `{id}` not found")))
}
