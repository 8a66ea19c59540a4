use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status of a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    /// Created, players may enroll and games may be scheduled.
    Pending,
    /// Games are being played.
    Active,
    /// Terminal state reached through the finish gate.
    Finished,
}

/// Events that drive a competition through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionEvent {
    /// Organizer opens play.
    Start,
    /// Organizer closes the competition once every game is resolved.
    Finish,
}

/// Lifecycle status of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Scheduled but not started.
    Pending,
    /// Being played.
    InProgress,
    /// Result recorded; terminal.
    Finished,
}

/// Events that drive a game through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Players sat down at the table.
    Start,
    /// A winner was recorded.
    Finish,
}

/// Error returned when an event cannot be applied to a competition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied to a {from} competition")]
pub struct InvalidCompetitionTransition {
    /// Status the competition was in when the event was received.
    pub from: CompetitionStatus,
    /// The rejected event.
    pub event: CompetitionEvent,
}

/// Error returned when an event cannot be applied to a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied to a {from} game")]
pub struct InvalidGameTransition {
    /// Status the game was in when the event was received.
    pub from: GameStatus,
    /// The rejected event.
    pub event: GameEvent,
}

/// Reasons the finish gate refuses to close a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FinishGateError {
    /// Not a single game of the competition has a result.
    #[error("no finished games")]
    NoFinishedGames,
    /// At least one game is still pending or in progress.
    #[error("unfinished games remain")]
    UnfinishedGamesRemain,
}

impl CompetitionStatus {
    /// Compute the status reached by applying `event`, if the transition is valid.
    pub fn apply(self, event: CompetitionEvent) -> Result<Self, InvalidCompetitionTransition> {
        let next = match (self, event) {
            (CompetitionStatus::Pending, CompetitionEvent::Start) => CompetitionStatus::Active,
            (CompetitionStatus::Pending | CompetitionStatus::Active, CompetitionEvent::Finish) => {
                CompetitionStatus::Finished
            }
            (from, event) => return Err(InvalidCompetitionTransition { from, event }),
        };

        Ok(next)
    }

    /// Whether the competition still accepts enrollments and new games.
    pub fn is_open(self) -> bool {
        !matches!(self, CompetitionStatus::Finished)
    }

    /// Name used in storage documents and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            CompetitionStatus::Pending => "pending",
            CompetitionStatus::Active => "active",
            CompetitionStatus::Finished => "finished",
        }
    }
}

impl GameStatus {
    /// Compute the status reached by applying `event`, if the transition is valid.
    pub fn apply(self, event: GameEvent) -> Result<Self, InvalidGameTransition> {
        let next = match (self, event) {
            (GameStatus::Pending, GameEvent::Start) => GameStatus::InProgress,
            (GameStatus::Pending | GameStatus::InProgress, GameEvent::Finish) => {
                GameStatus::Finished
            }
            (from, event) => return Err(InvalidGameTransition { from, event }),
        };

        Ok(next)
    }

    /// Whether a result has been recorded.
    pub fn is_finished(self) -> bool {
        matches!(self, GameStatus::Finished)
    }

    /// Name used in storage documents and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Pending => "pending",
            GameStatus::InProgress => "in_progress",
            GameStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a competition whose games have the given statuses may be finished.
///
/// The absence of any finished game is reported before unresolved games, so a
/// competition without games fails with [`FinishGateError::NoFinishedGames`].
pub fn check_finish_gate<I>(statuses: I) -> Result<(), FinishGateError>
where
    I: IntoIterator<Item = GameStatus>,
{
    let mut any_finished = false;
    let mut any_unfinished = false;
    for status in statuses {
        if status.is_finished() {
            any_finished = true;
        } else {
            any_unfinished = true;
        }
    }

    if !any_finished {
        return Err(FinishGateError::NoFinishedGames);
    }
    if any_unfinished {
        return Err(FinishGateError::UnfinishedGamesRemain);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competition_happy_path() {
        let status = CompetitionStatus::Pending;
        let status = status.apply(CompetitionEvent::Start).unwrap();
        assert_eq!(status, CompetitionStatus::Active);
        let status = status.apply(CompetitionEvent::Finish).unwrap();
        assert_eq!(status, CompetitionStatus::Finished);
    }

    #[test]
    fn pending_competition_can_finish_directly() {
        assert_eq!(
            CompetitionStatus::Pending.apply(CompetitionEvent::Finish),
            Ok(CompetitionStatus::Finished)
        );
    }

    #[test]
    fn finished_competition_is_terminal() {
        for event in [CompetitionEvent::Start, CompetitionEvent::Finish] {
            let err = CompetitionStatus::Finished.apply(event).unwrap_err();
            assert_eq!(err.from, CompetitionStatus::Finished);
            assert_eq!(err.event, event);
        }
    }

    #[test]
    fn active_competition_cannot_restart() {
        assert!(CompetitionStatus::Active.apply(CompetitionEvent::Start).is_err());
    }

    #[test]
    fn game_transitions() {
        assert_eq!(GameStatus::Pending.apply(GameEvent::Start), Ok(GameStatus::InProgress));
        assert_eq!(GameStatus::Pending.apply(GameEvent::Finish), Ok(GameStatus::Finished));
        assert_eq!(GameStatus::InProgress.apply(GameEvent::Finish), Ok(GameStatus::Finished));
        assert!(GameStatus::InProgress.apply(GameEvent::Start).is_err());
    }

    #[test]
    fn finished_game_rejects_second_finish() {
        let err = GameStatus::Finished.apply(GameEvent::Finish).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid transition: Finish cannot be applied to a finished game"
        );
    }

    #[test]
    fn gate_without_games_reports_no_finished_games() {
        assert_eq!(check_finish_gate(std::iter::empty()), Err(FinishGateError::NoFinishedGames));
        assert_eq!(FinishGateError::NoFinishedGames.to_string(), "no finished games");
    }

    #[test]
    fn gate_with_only_unfinished_games_reports_no_finished_games() {
        assert_eq!(
            check_finish_gate([GameStatus::Pending, GameStatus::InProgress]),
            Err(FinishGateError::NoFinishedGames)
        );
    }

    #[test]
    fn gate_with_pending_game_reports_unfinished() {
        let err = check_finish_gate([GameStatus::Finished, GameStatus::Pending]).unwrap_err();
        assert_eq!(err, FinishGateError::UnfinishedGamesRemain);
        assert_eq!(err.to_string(), "unfinished games remain");
        assert_eq!(
            check_finish_gate([GameStatus::InProgress, GameStatus::Finished]),
            Err(FinishGateError::UnfinishedGamesRemain)
        );
    }

    #[test]
    fn gate_opens_when_every_game_is_finished() {
        assert_eq!(check_finish_gate([GameStatus::Finished]), Ok(()));
        assert_eq!(
            check_finish_gate([GameStatus::Finished, GameStatus::Finished]),
            Ok(())
        );
    }
}
