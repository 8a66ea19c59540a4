use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::lifecycle::{FinishGateError, InvalidCompetitionTransition, InvalidGameTransition},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed input provided by the client.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Operation is not valid in the current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The competition finish gate is not satisfied.
    #[error("precondition failed: {0}")]
    PreconditionFailed(#[from] FinishGateError),
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout,
}

impl ServiceError {
    /// Caller-correctable failures; retrying them unchanged cannot succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_)
                | ServiceError::InvalidArgument(_)
                | ServiceError::InvalidState(_)
                | ServiceError::PreconditionFailed(_)
        )
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<InvalidCompetitionTransition> for ServiceError {
    fn from(err: InvalidCompetitionTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<InvalidGameTransition> for ServiceError {
    fn from(err: InvalidGameTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidArgument(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Well-formed request whose preconditions are not met.
    #[error("precondition failed: {0}")]
    Unprocessable(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        if !err.is_client_error() {
            tracing::warn!(error = %err, "request failed on the server side");
        }
        match err {
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::InvalidArgument(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::PreconditionFailed(reason) => AppError::Unprocessable(reason.to_string()),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Timeout => AppError::ServiceUnavailable("operation timed out".into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_http_statuses() {
        let cases = [
            (ServiceError::NotFound("game".into()), StatusCode::NOT_FOUND),
            (ServiceError::InvalidArgument("winner".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidState("finished".into()), StatusCode::CONFLICT),
            (
                ServiceError::PreconditionFailed(FinishGateError::NoFinishedGames),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ServiceError::Degraded, StatusCode::SERVICE_UNAVAILABLE),
            (ServiceError::Timeout, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn finish_gate_reason_is_kept_verbatim() {
        let err = AppError::from(ServiceError::from(FinishGateError::UnfinishedGamesRemain));
        assert_eq!(err.to_string(), "precondition failed: unfinished games remain");
    }

    #[test]
    fn only_lifecycle_and_input_errors_are_client_errors() {
        assert!(ServiceError::InvalidState("x".into()).is_client_error());
        assert!(!ServiceError::Timeout.is_client_error());
        assert!(!ServiceError::Degraded.is_client_error());
    }
}
