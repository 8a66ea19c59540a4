use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        competition::{
            CompetitionSummary, EnrollPlayerRequest, EnrolledPlayer, EnrollmentResponse,
            ScheduleResponse, UpdateCompetitionRequest,
        },
        game::{CreateGameRequest, GameSummary},
        stats::PlayerStatsSummary,
    },
    error::AppError,
    services::{competition_service, stats_service},
    state::SharedState,
};

/// Competition lifecycle, enrollment, scheduling and standings endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route(
            "/competitions/{id}",
            get(get_competition)
                .put(update_competition)
                .delete(delete_competition),
        )
        .route("/competitions/{id}/start", post(start_competition))
        .route("/competitions/{id}/finish", post(finish_competition))
        .route(
            "/competitions/{id}/players",
            get(list_enrolled_players).post(enroll_player),
        )
        .route(
            "/competitions/{id}/games",
            get(list_games).post(create_game),
        )
        .route("/competitions/{id}/schedule", post(schedule_round_robin))
        .route("/competitions/{id}/stats", get(competition_stats))
        .route(
            "/competitions/{id}/stats/{player_id}",
            get(player_stats),
        )
}

/// Fetch a competition.
#[utoipa::path(
    get,
    path = "/competitions/{id}",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses(
        (status = 200, description = "Competition", body = CompetitionSummary),
        (status = 404, description = "Unknown competition"),
    )
)]
pub async fn get_competition(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetitionSummary>, AppError> {
    Ok(Json(competition_service::get_competition(&state, id).await?))
}

/// Edit a competition's name, description or dates.
#[utoipa::path(
    put,
    path = "/competitions/{id}",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the competition")),
    request_body = UpdateCompetitionRequest,
    responses(
        (status = 200, description = "Competition updated", body = CompetitionSummary),
        (status = 400, description = "Invalid dates"),
    )
)]
pub async fn update_competition(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateCompetitionRequest>>,
) -> Result<Json<CompetitionSummary>, AppError> {
    Ok(Json(
        competition_service::update_competition(&state, id, payload).await?,
    ))
}

/// Delete a competition that has no games, together with its enrollments and stats.
#[utoipa::path(
    delete,
    path = "/competitions/{id}",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 409, description = "Competition still has games"),
    )
)]
pub async fn delete_competition(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    competition_service::delete_competition(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a pending competition to `active`.
#[utoipa::path(
    post,
    path = "/competitions/{id}/start",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses(
        (status = 200, description = "Competition started", body = CompetitionSummary),
        (status = 409, description = "Competition is not pending"),
    )
)]
pub async fn start_competition(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetitionSummary>, AppError> {
    Ok(Json(competition_service::start_competition(&state, id).await?))
}

/// Finish a competition once every game has been played.
#[utoipa::path(
    post,
    path = "/competitions/{id}/finish",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses(
        (status = 200, description = "Competition finished", body = CompetitionSummary),
        (status = 409, description = "Competition already finished"),
        (status = 422, description = "`no finished games` or `unfinished games remain`"),
    )
)]
pub async fn finish_competition(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetitionSummary>, AppError> {
    Ok(Json(competition_service::finish_competition(&state, id).await?))
}

/// List the players enrolled in a competition.
#[utoipa::path(
    get,
    path = "/competitions/{id}/players",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses((status = 200, description = "Enrolled players", body = [EnrolledPlayer]))
)]
pub async fn list_enrolled_players(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EnrolledPlayer>>, AppError> {
    Ok(Json(
        competition_service::list_enrolled_players(&state, id).await?,
    ))
}

/// Enroll a player; enrolling twice is a no-op.
#[utoipa::path(
    post,
    path = "/competitions/{id}/players",
    tag = "competitions",
    params(("id" = String, Path, description = "Identifier of the competition")),
    request_body = EnrollPlayerRequest,
    responses(
        (status = 201, description = "Player enrolled", body = EnrollmentResponse),
        (status = 200, description = "Player was already enrolled", body = EnrollmentResponse),
        (status = 409, description = "Competition is finished"),
    )
)]
pub async fn enroll_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<EnrollPlayerRequest>>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), AppError> {
    let enrollment = competition_service::enroll_player(&state, id, payload.player_id).await?;
    let status = if enrollment.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(enrollment)))
}

/// List the games of a competition.
#[utoipa::path(
    get,
    path = "/competitions/{id}/games",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses((status = 200, description = "Games", body = [GameSummary]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    Ok(Json(competition_service::list_games(&state, id).await?))
}

/// Create a pending game between two enrolled players.
#[utoipa::path(
    post,
    path = "/competitions/{id}/games",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the competition")),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameSummary),
        (status = 400, description = "Players are identical or not enrolled"),
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameSummary>), AppError> {
    let game = competition_service::create_game(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// Create the missing games so every pair of enrolled players meets once.
#[utoipa::path(
    post,
    path = "/competitions/{id}/schedule",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses((status = 200, description = "Games created by this call", body = ScheduleResponse))
)]
pub async fn schedule_round_robin(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, AppError> {
    Ok(Json(
        competition_service::schedule_round_robin(&state, id).await?,
    ))
}

/// Standings of a competition.
#[utoipa::path(
    get,
    path = "/competitions/{id}/stats",
    tag = "stats",
    params(("id" = String, Path, description = "Identifier of the competition")),
    responses((status = 200, description = "Standings, best first", body = [PlayerStatsSummary]))
)]
pub async fn competition_stats(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayerStatsSummary>>, AppError> {
    Ok(Json(stats_service::competition_stats(&state, id).await?))
}

/// Counters of one player within a competition.
#[utoipa::path(
    get,
    path = "/competitions/{id}/stats/{player_id}",
    tag = "stats",
    params(
        ("id" = String, Path, description = "Identifier of the competition"),
        ("player_id" = String, Path, description = "Identifier of the player"),
    ),
    responses(
        (status = 200, description = "Stats row", body = PlayerStatsSummary),
        (status = 404, description = "Player is not enrolled"),
    )
)]
pub async fn player_stats(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PlayerStatsSummary>, AppError> {
    Ok(Json(
        stats_service::player_stats(&state, id, player_id).await?,
    ))
}
