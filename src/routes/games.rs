use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{GameResultResponse, GameSummary, RecordResultRequest},
    error::AppError,
    services::{competition_service, stats_service},
    state::SharedState,
};

/// Single-game endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/start", post(start_game))
        .route("/games/{id}/result", post(record_result))
}

/// Fetch a game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game", body = GameSummary),
        (status = 404, description = "Unknown game"),
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(competition_service::get_game(&state, id).await?))
}

/// Move a pending game to `in_progress`.
#[utoipa::path(
    post,
    path = "/games/{id}/start",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game started", body = GameSummary),
        (status = 409, description = "Game is not pending"),
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(competition_service::start_game(&state, id).await?))
}

/// Record the winner of a game and credit both players' stats.
#[utoipa::path(
    post,
    path = "/games/{id}/result",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game")),
    request_body = RecordResultRequest,
    responses(
        (status = 200, description = "Result recorded", body = GameResultResponse),
        (status = 400, description = "Winner does not play in this game"),
        (status = 404, description = "Unknown game or missing stats row"),
        (status = 409, description = "Game already finished"),
    )
)]
pub async fn record_result(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<RecordResultRequest>>,
) -> Result<Json<GameResultResponse>, AppError> {
    Ok(Json(
        stats_service::record_game_result(&state, id, payload).await?,
    ))
}
