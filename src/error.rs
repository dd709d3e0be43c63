use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::{question_source::SourceError, storage::StorageError},
    state::{
        matching::MatchingError,
        question::GradeError,
        round::RoundError,
        trivia::TriviaError,
        verse::RangeError,
    },
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Question backend failed.
    #[error("question source failed")]
    Source(#[source] SourceError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Server-side misconfiguration.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<SourceError> for ServiceError {
    fn from(err: SourceError) -> Self {
        ServiceError::Source(err)
    }
}

impl From<MatchingError> for ServiceError {
    fn from(err: MatchingError) -> Self {
        match err {
            MatchingError::UnknownCard(_) => ServiceError::InvalidInput(err.to_string()),
            MatchingError::AlreadyMatched(_) | MatchingError::RoundOver(_) => {
                ServiceError::InvalidState(err.to_string())
            }
        }
    }
}

impl From<RoundError> for ServiceError {
    fn from(err: RoundError) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<TriviaError> for ServiceError {
    fn from(err: TriviaError) -> Self {
        match err {
            TriviaError::UnknownClue(_) => ServiceError::NotFound(err.to_string()),
            TriviaError::UnknownTeam(_) => ServiceError::InvalidInput(err.to_string()),
            TriviaError::AlreadyAsked(_)
            | TriviaError::ClueOpen(_)
            | TriviaError::NoOpenClue
            | TriviaError::GameStarted => ServiceError::InvalidState(err.to_string()),
        }
    }
}

impl From<RangeError> for ServiceError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::OutOfBounds { .. } | RangeError::NotInRange { .. } => {
                ServiceError::InvalidInput(err.to_string())
            }
            RangeError::NoVerses => ServiceError::NotFound(err.to_string()),
            RangeError::Catalog(_) => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<GradeError> for ServiceError {
    fn from(err: GradeError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("{0}")]
    Conflict(String),
    /// Upstream question backend failed.
    #[error("{0}")]
    BadGateway(String),
    /// Storage unavailable.
    #[error("{0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Source(SourceError::UnknownTable(table)) => {
                AppError::Internal(format!("question table `{table}` is not configured"))
            }
            ServiceError::Source(source) => AppError::BadGateway(source.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
