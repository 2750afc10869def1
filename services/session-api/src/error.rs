//! Error types for the Session API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use parlo_auth_core::{AuthError, FieldIssue};

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<FieldIssue>>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or wrong credentials. Deliberately carries no detail so
    /// a malformed header and a wrong password are indistinguishable.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bearer header present but the token is empty
    #[error("Session token is required")]
    MissingToken,

    /// Structurally valid token past its lifetime
    #[error("Session token has expired")]
    TokenExpired,

    /// Malformed, tampered, or wrong-scope token; a stronger rejection
    /// than a merely stale one
    #[error("Invalid session token")]
    InvalidToken,

    /// Recognized body fields violate their constraints
    #[error("Invalid request body")]
    Validation(Vec<FieldIssue>),

    /// Unexpected failure; the body never leaks internals
    #[error("Failed to validate session token")]
    Internal,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::MissingToken | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => Self::TokenExpired,
            AuthError::InvalidToken => Self::InvalidToken,
            AuthError::Unauthenticated => Self::Unauthorized,
            AuthError::Validation(issues) => Self::Validation(issues),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if matches!(self, Self::Internal) {
            tracing::error!(error = ?self, "Internal API error");
        }

        let issues = match &self {
            Self::Validation(issues) => Some(issues.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            issues,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
