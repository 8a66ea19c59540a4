use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::player::{CreatePlayerRequest, PlayerSummary, UpdatePlayerRequest},
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Player registry endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/players", get(list_players).post(create_player))
        .route("/players/{id}", get(get_player).put(update_player))
}

/// List every registered player.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    responses((status = 200, description = "Registered players", body = [PlayerSummary]))
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    Ok(Json(player_service::list_players(&state).await?))
}

/// Register a new player.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player registered", body = PlayerSummary),
        (status = 400, description = "Invalid payload"),
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePlayerRequest>>,
) -> Result<(StatusCode, Json<PlayerSummary>), AppError> {
    let player = player_service::create_player(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Fetch a player profile.
#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Identifier of the player")),
    responses(
        (status = 200, description = "Player", body = PlayerSummary),
        (status = 404, description = "Unknown player"),
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerSummary>, AppError> {
    Ok(Json(player_service::get_player(&state, id).await?))
}

/// Update a player profile; omitted fields are left untouched.
#[utoipa::path(
    put,
    path = "/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Identifier of the player")),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Player updated", body = PlayerSummary),
        (status = 404, description = "Unknown player"),
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdatePlayerRequest>>,
) -> Result<Json<PlayerSummary>, AppError> {
    Ok(Json(player_service::update_player(&state, id, payload).await?))
}
