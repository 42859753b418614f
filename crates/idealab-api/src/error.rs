//! API error taxonomy and HTTP mapping
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl
//! maps each variant onto the JSON error envelope and status code the
//! clients expect. Internal detail (database errors, collaborator
//! failures) is logged here and never leaked to the caller.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Failures surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required field; nothing was persisted
    #[error("{0}")]
    Validation(String),

    /// No usable session on a protected endpoint
    #[error("Authentication required")]
    Unauthenticated,

    /// Session present but the role/ownership check failed
    #[error("You are not allowed to perform this action")]
    Forbidden,

    /// Sign-in refused by the admission policy
    #[error("Sign-in is restricted to institutional accounts")]
    AccessDenied,

    /// Genuine absence, and deliberately also "exists but not owned by you"
    #[error("Resource not found")]
    NotFound,

    /// Database failure
    #[error("Database error")]
    Database(#[from] DbErr),

    /// Object storage / mail / PDF collaborator failure
    #[error("A downstream service failed")]
    Collaborator(String),

    /// Anything else that should not happen
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Collaborator(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
            Self::Collaborator(_) => "COLLABORATOR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(e) => error!("Database error: {}", e),
            Self::Collaborator(detail) => error!("Collaborator failure: {}", detail),
            Self::Internal(detail) => error!("Internal error: {}", detail),
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: Some(self.code().to_string()),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Convenience alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;
