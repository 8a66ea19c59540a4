use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the league backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::players::list_players,
        crate::routes::players::create_player,
        crate::routes::players::get_player,
        crate::routes::players::update_player,
        crate::routes::communities::list_communities,
        crate::routes::communities::create_community,
        crate::routes::communities::get_community,
        crate::routes::communities::update_community,
        crate::routes::communities::delete_community,
        crate::routes::communities::list_members,
        crate::routes::communities::add_member,
        crate::routes::communities::remove_member,
        crate::routes::communities::list_available_players,
        crate::routes::communities::list_competitions,
        crate::routes::communities::create_competition,
        crate::routes::competitions::get_competition,
        crate::routes::competitions::update_competition,
        crate::routes::competitions::delete_competition,
        crate::routes::competitions::start_competition,
        crate::routes::competitions::finish_competition,
        crate::routes::competitions::list_enrolled_players,
        crate::routes::competitions::enroll_player,
        crate::routes::competitions::list_games,
        crate::routes::competitions::create_game,
        crate::routes::competitions::schedule_round_robin,
        crate::routes::competitions::competition_stats,
        crate::routes::competitions::player_stats,
        crate::routes::games::get_game,
        crate::routes::games::start_game,
        crate::routes::games::record_result,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::player::CreatePlayerRequest,
            crate::dto::player::UpdatePlayerRequest,
            crate::dto::player::PlayerSummary,
            crate::dto::community::CreateCommunityRequest,
            crate::dto::community::UpdateCommunityRequest,
            crate::dto::community::CommunitySummary,
            crate::dto::community::AddMemberRequest,
            crate::dto::community::MemberSummary,
            crate::dto::competition::CreateCompetitionRequest,
            crate::dto::competition::UpdateCompetitionRequest,
            crate::dto::competition::CompetitionSummary,
            crate::dto::competition::EnrollPlayerRequest,
            crate::dto::competition::EnrollmentResponse,
            crate::dto::competition::EnrolledPlayer,
            crate::dto::competition::ScheduleResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::RecordResultRequest,
            crate::dto::game::GameSummary,
            crate::dto::game::GameResultResponse,
            crate::dto::stats::PlayerStatsSummary,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::PlayerEnrolledEvent,
            crate::dao::models::UserRole,
            crate::dao::models::VictoryType,
            crate::dao::models::VictoryCounters,
            crate::state::lifecycle::CompetitionStatus,
            crate::state::lifecycle::GameStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "players", description = "Player registry"),
        (name = "communities", description = "Communities and their members"),
        (name = "competitions", description = "Competition lifecycle and enrollment"),
        (name = "games", description = "Games and result recording"),
        (name = "stats", description = "Per-competition player standings"),
    )
)]
pub struct ApiDoc;
