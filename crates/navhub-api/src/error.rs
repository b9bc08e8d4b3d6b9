//! HTTP error type
//!
//! Every handler returns `Result<_, ApiError>`; domain errors convert via `From`
//! and render as the `{success, error: {code, message}, timestamp}` envelope.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use navhub_core::error::DomainError;

use crate::response::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail(_) | ApiError::CapacityExceeded(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ParentNotFound(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            ApiError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            ApiError::ParentNotFound(_) => "PARENT_NOT_FOUND",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::DuplicateEmail(msg)
            | ApiError::CapacityExceeded(msg)
            | ApiError::ParentNotFound(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
            ApiError::InvalidCredentials => self.to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidCredentials => ApiError::InvalidCredentials,
            DomainError::InvalidToken(_) => ApiError::Unauthorized("Not authorized, token failed".into()),
            DomainError::EmailAlreadyExists(_) => {
                ApiError::DuplicateEmail("User already exists with this email".into())
            }
            DomainError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            DomainError::MenuNotFound(_) => ApiError::NotFound("Menu not found".into()),
            DomainError::NodeNotFound(_) => ApiError::NotFound("Node not found".into()),
            DomainError::ParentNotFound(_) => ApiError::ParentNotFound(err.to_string()),
            DomainError::MenuCapacityExceeded { .. } | DomainError::ParentCapacityExceeded { .. } => {
                ApiError::CapacityExceeded(err.to_string())
            }
            DomainError::HierarchyCycle(_) | DomainError::ValidationError(_) => {
                ApiError::Validation(err.to_string())
            }
            DomainError::PasswordTooShort => {
                ApiError::Validation("Password must be at least 6 characters".into())
            }
            DomainError::PasswordTooLong => {
                ApiError::Validation("Password must be at most 128 characters".into())
            }
            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(format!("Invalid id: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(msg) => error!("Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => error!("Service unavailable: {}", msg),
            other => warn!(code = other.code(), "{}", other),
        }

        let body = Json(ErrorResponse::new(self.code(), &self.public_message()));
        (status, body).into_response()
    }
}
