use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use uspage_core::{ApiResponse, CoreError};

pub type AppResult<T> = Result<T, AppError>;

/// HTTP-facing error: a status code plus a user-facing message, rendered
/// in the standard failure envelope.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::error(self.message));
        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound => Self::not_found("Resource not found"),
            CoreError::Forbidden => {
                Self::forbidden("You do not have permission to perform this action")
            }
            CoreError::Validation(message) => Self::unprocessable(message),
            CoreError::Conflict(message) => Self::unprocessable(message),
            CoreError::Unauthenticated => Self::unauthorized("Unauthenticated"),
            CoreError::InvalidCredentials => {
                Self::unauthorized("The provided credentials are incorrect")
            }
            CoreError::Storage(message)
            | CoreError::Database(message)
            | CoreError::Internal(message) => Self::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_expected_status_codes() {
        let cases = [
            (CoreError::NotFound, StatusCode::NOT_FOUND),
            (CoreError::Forbidden, StatusCode::FORBIDDEN),
            (
                CoreError::Validation("bad".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Conflict("dup".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (CoreError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (CoreError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                CoreError::Database("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn forbidden_and_not_found_stay_distinguishable() {
        let forbidden = AppError::from(CoreError::Forbidden);
        let not_found = AppError::from(CoreError::NotFound);
        assert_ne!(forbidden.status, not_found.status);
    }
}
