use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Service-level error taxonomy.
///
/// Validation and business-rule failures carry a human-readable message and
/// map to the corresponding HTTP status; database and external failures
/// surface as a generic server error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("External service error: {0}")]
    External(String),
}

impl ApiError {
    /// Stable machine-readable error label used in response bodies.
    pub fn label(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Database(_) | ApiError::External(_) => "internal_error",
        }
    }

    /// Map a database error during an insert to a conflict when it is a
    /// unique-constraint violation, keeping the caller-facing message.
    pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => ApiError::Conflict(message.to_string()),
            _ => ApiError::Database(err),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::External(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::External(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
        }

        // Internal details are not leaked to the caller.
        let message = match self {
            ApiError::Database(_) | ApiError::External(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.label().to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::External("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_not_leaked() {
        let resp = ApiError::External("credentials leaked here".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_row_not_found_is_internal() {
        // Missing rows are handled explicitly by services; a RowNotFound
        // reaching this layer is a bug, not a 404.
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
