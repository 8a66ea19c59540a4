use std::sync::Arc;

use domatch_back::{
    config::AppConfig,
    dao::{league_store::MemoryLeagueStore, models::UserRole},
    dto::{
        community::{AddMemberRequest, CreateCommunityRequest, UpdateCommunityRequest},
        competition::CreateCompetitionRequest,
        player::CreatePlayerRequest,
    },
    error::ServiceError,
    services::{community_service, competition_service, player_service},
    state::{AppState, SharedState},
};
use uuid::Uuid;

async fn league() -> SharedState {
    AppState::with_store(AppConfig::in_memory(), Arc::new(MemoryLeagueStore::new())).await
}

async fn player(state: &SharedState, name: &str) -> Uuid {
    player_service::create_player(
        state,
        CreatePlayerRequest {
            name: name.into(),
            nickname: None,
            phone: None,
            email: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn community(state: &SharedState, admin_id: Uuid) -> Uuid {
    community_service::create_community(
        state,
        CreateCommunityRequest {
            name: "  Peña del malecón ".into(),
            description: Some("Jueves y domingos".into()),
            whatsapp_group_id: None,
            admin_id,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn community_requires_registered_admin() {
    let state = league().await;
    let err = community_service::create_community(
        &state,
        CreateCommunityRequest {
            name: "Sin dueño".into(),
            description: None,
            whatsapp_group_id: None,
            admin_id: Uuid::new_v4(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn membership_lifecycle() {
    let state = league().await;
    let admin = player(&state, "Admin").await;
    let ana = player(&state, "Ana").await;
    let c = community(&state, admin).await;

    let fetched = community_service::get_community(&state, c).await.unwrap();
    assert_eq!(fetched.name, "Peña del malecón");

    let available = community_service::list_available_players(&state, c)
        .await
        .unwrap();
    assert_eq!(available.len(), 2);

    let member = community_service::add_member(
        &state,
        c,
        AddMemberRequest {
            user_id: ana,
            role: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(member.role, UserRole::Player);
    assert_eq!(member.player.name, "Ana");

    let duplicate = community_service::add_member(
        &state,
        c,
        AddMemberRequest {
            user_id: ana,
            role: Some(UserRole::Organizer),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(duplicate, ServiceError::InvalidState(_)));

    let members = community_service::list_members(&state, c).await.unwrap();
    assert_eq!(members.len(), 1);
    let available = community_service::list_available_players(&state, c)
        .await
        .unwrap();
    assert!(available.iter().all(|player| player.id != ana));

    community_service::remove_member(&state, c, ana).await.unwrap();
    assert!(matches!(
        community_service::remove_member(&state, c, ana).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_clears_optional_fields_on_null() {
    let state = league().await;
    let admin = player(&state, "Admin").await;
    let c = community(&state, admin).await;

    let request: UpdateCommunityRequest =
        serde_json::from_str(r#"{"description": null}"#).unwrap();
    let updated = community_service::update_community(&state, c, request)
        .await
        .unwrap();
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, "Peña del malecón");
}

#[tokio::test]
async fn community_with_competitions_cannot_be_deleted() {
    let state = league().await;
    let admin = player(&state, "Admin").await;
    let c = community(&state, admin).await;
    let competition = competition_service::create_competition(
        &state,
        c,
        CreateCompetitionRequest {
            name: "Relámpago".into(),
            description: None,
            start_date: None,
            end_date: None,
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        community_service::delete_community(&state, c).await,
        Err(ServiceError::InvalidState(_))
    ));

    competition_service::delete_competition(&state, competition.id)
        .await
        .unwrap();
    community_service::delete_community(&state, c).await.unwrap();
    assert!(matches!(
        community_service::get_community(&state, c).await,
        Err(ServiceError::NotFound(_))
    ));
}
