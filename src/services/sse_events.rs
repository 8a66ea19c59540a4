use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        competition::CompetitionSummary,
        game::{GameResultResponse, GameSummary},
        sse::{PlayerEnrolledEvent, ServerEvent, SystemStatus},
    },
    state::SharedState,
};

const EVENT_SYSTEM_STATUS: &str = "system.status";
const EVENT_COMPETITION_CREATED: &str = "competition.created";
const EVENT_COMPETITION_STARTED: &str = "competition.started";
const EVENT_COMPETITION_FINISHED: &str = "competition.finished";
const EVENT_PLAYER_ENROLLED: &str = "player.enrolled";
const EVENT_GAME_CREATED: &str = "game.created";
const EVENT_GAME_STARTED: &str = "game.started";
const EVENT_GAME_FINISHED: &str = "game.finished";

/// Broadcast whether the backend currently runs without storage.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Broadcast a newly created competition.
pub fn broadcast_competition_created(state: &SharedState, competition: &CompetitionSummary) {
    send_public_event(state, EVENT_COMPETITION_CREATED, competition);
}

/// Broadcast a competition that moved to `active`.
pub fn broadcast_competition_started(state: &SharedState, competition: &CompetitionSummary) {
    send_public_event(state, EVENT_COMPETITION_STARTED, competition);
}

/// Broadcast a competition that passed the finish gate.
pub fn broadcast_competition_finished(state: &SharedState, competition: &CompetitionSummary) {
    send_public_event(state, EVENT_COMPETITION_FINISHED, competition);
}

/// Broadcast a first-time enrollment.
pub fn broadcast_player_enrolled(state: &SharedState, competition_id: Uuid, player_id: Uuid) {
    let payload = PlayerEnrolledEvent {
        competition_id,
        player_id,
    };
    send_public_event(state, EVENT_PLAYER_ENROLLED, &payload);
}

/// Broadcast a game that has been scheduled.
pub fn broadcast_game_created(state: &SharedState, game: &GameSummary) {
    send_public_event(state, EVENT_GAME_CREATED, game);
}

/// Broadcast a game that moved to `in_progress`.
pub fn broadcast_game_started(state: &SharedState, game: &GameSummary) {
    send_public_event(state, EVENT_GAME_STARTED, game);
}

/// Broadcast a finished game with both updated stats rows.
pub fn broadcast_game_finished(state: &SharedState, result: &GameResultResponse) {
    send_public_event(state, EVENT_GAME_FINISHED, result);
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
