use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        community::{
            AddMemberRequest, CommunitySummary, CreateCommunityRequest, MemberSummary,
            UpdateCommunityRequest,
        },
        competition::{CompetitionSummary, CreateCompetitionRequest},
        player::PlayerSummary,
    },
    error::AppError,
    services::{community_service, competition_service},
    state::SharedState,
};

/// Community and membership endpoints, plus competition creation under a community.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/communities", get(list_communities).post(create_community))
        .route(
            "/communities/{id}",
            get(get_community)
                .put(update_community)
                .delete(delete_community),
        )
        .route(
            "/communities/{id}/members",
            get(list_members).post(add_member),
        )
        .route(
            "/communities/{id}/members/{user_id}",
            delete(remove_member),
        )
        .route(
            "/communities/{id}/available-players",
            get(list_available_players),
        )
        .route(
            "/communities/{id}/competitions",
            get(list_competitions).post(create_competition),
        )
}

/// List every community.
#[utoipa::path(
    get,
    path = "/communities",
    tag = "communities",
    responses((status = 200, description = "Communities", body = [CommunitySummary]))
)]
pub async fn list_communities(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CommunitySummary>>, AppError> {
    Ok(Json(community_service::list_communities(&state).await?))
}

/// Create a community administered by an existing player.
#[utoipa::path(
    post,
    path = "/communities",
    tag = "communities",
    request_body = CreateCommunityRequest,
    responses(
        (status = 201, description = "Community created", body = CommunitySummary),
        (status = 404, description = "Unknown admin player"),
    )
)]
pub async fn create_community(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateCommunityRequest>>,
) -> Result<(StatusCode, Json<CommunitySummary>), AppError> {
    let community = community_service::create_community(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(community)))
}

/// Fetch a community.
#[utoipa::path(
    get,
    path = "/communities/{id}",
    tag = "communities",
    params(("id" = String, Path, description = "Identifier of the community")),
    responses(
        (status = 200, description = "Community", body = CommunitySummary),
        (status = 404, description = "Unknown community"),
    )
)]
pub async fn get_community(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommunitySummary>, AppError> {
    Ok(Json(community_service::get_community(&state, id).await?))
}

/// Update a community's metadata.
#[utoipa::path(
    put,
    path = "/communities/{id}",
    tag = "communities",
    params(("id" = String, Path, description = "Identifier of the community")),
    request_body = UpdateCommunityRequest,
    responses((status = 200, description = "Community updated", body = CommunitySummary))
)]
pub async fn update_community(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateCommunityRequest>>,
) -> Result<Json<CommunitySummary>, AppError> {
    Ok(Json(
        community_service::update_community(&state, id, payload).await?,
    ))
}

/// Delete a community that no longer owns competitions.
#[utoipa::path(
    delete,
    path = "/communities/{id}",
    tag = "communities",
    params(("id" = String, Path, description = "Identifier of the community")),
    responses(
        (status = 204, description = "Community deleted"),
        (status = 409, description = "Community still has competitions"),
    )
)]
pub async fn delete_community(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    community_service::delete_community(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the members of a community.
#[utoipa::path(
    get,
    path = "/communities/{id}/members",
    tag = "communities",
    params(("id" = String, Path, description = "Identifier of the community")),
    responses((status = 200, description = "Members", body = [MemberSummary]))
)]
pub async fn list_members(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MemberSummary>>, AppError> {
    Ok(Json(community_service::list_members(&state, id).await?))
}

/// Add a player to a community.
#[utoipa::path(
    post,
    path = "/communities/{id}/members",
    tag = "communities",
    params(("id" = String, Path, description = "Identifier of the community")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberSummary),
        (status = 409, description = "Player already a member"),
    )
)]
pub async fn add_member(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AddMemberRequest>>,
) -> Result<(StatusCode, Json<MemberSummary>), AppError> {
    let member = community_service::add_member(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Remove a player from a community.
#[utoipa::path(
    delete,
    path = "/communities/{id}/members/{user_id}",
    tag = "communities",
    params(
        ("id" = String, Path, description = "Identifier of the community"),
        ("user_id" = String, Path, description = "Identifier of the member player"),
    ),
    responses((status = 204, description = "Member removed"))
)]
pub async fn remove_member(
    State(state): State<SharedState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    community_service::remove_member(&state, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Players that could still be added to the community.
#[utoipa::path(
    get,
    path = "/communities/{id}/available-players",
    tag = "communities",
    params(("id" = String, Path, description = "Identifier of the community")),
    responses((status = 200, description = "Players outside the community", body = [PlayerSummary]))
)]
pub async fn list_available_players(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    Ok(Json(
        community_service::list_available_players(&state, id).await?,
    ))
}

/// List the competitions of a community.
#[utoipa::path(
    get,
    path = "/communities/{id}/competitions",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the community")),
    responses((status = 200, description = "Competitions", body = [CompetitionSummary]))
)]
pub async fn list_competitions(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CompetitionSummary>>, AppError> {
    Ok(Json(competition_service::list_competitions(&state, id).await?))
}

/// Create a `pending` competition inside a community.
#[utoipa::path(
    post,
    path = "/communities/{id}/competitions",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the community")),
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionSummary),
        (status = 400, description = "Invalid dates"),
    )
)]
pub async fn create_competition(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<CreateCompetitionRequest>>,
) -> Result<(StatusCode, Json<CompetitionSummary>), AppError> {
    let competition = competition_service::create_competition(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(competition)))
}
