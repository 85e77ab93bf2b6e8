//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::error;

use crate::domain::DomainError;

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthorized | DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Session(_) | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            DomainError::Validation(details) => ErrorResponse {
                error: "Validation failed".to_string(),
                details,
            },
            DomainError::Session(_) | DomainError::Internal(_) => {
                error!("Request failed: {:#}", self);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    details: Vec::new(),
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                details: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(DomainError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(DomainError::NotFound("Child").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(DomainError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(DomainError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(DomainError::Conflict("taken".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            DomainError::Internal(anyhow::anyhow!("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let response = DomainError::Internal(anyhow::anyhow!("secret path /var/db")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
