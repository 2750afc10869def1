//! Auth errors

use thiserror::Error;

/// A single field-level validation issue
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldIssue {
    /// Path of the offending field (e.g. "ttlSeconds")
    pub path: String,
    /// Human-readable constraint description
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed, tampered, wrong-scope, or unparseable token.
    /// The client must re-authenticate from scratch.
    #[error("Invalid session token")]
    InvalidToken,

    /// Structurally valid token past its lifetime.
    /// The client may retry the mint flow.
    #[error("Session token has expired")]
    TokenExpired,

    /// Missing or wrong credentials
    #[error("Unauthorized")]
    Unauthenticated,

    /// Caller-supplied fields violate recognized constraints
    #[error("Invalid request body")]
    Validation(Vec<FieldIssue>),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TokenExpired | Self::Unauthenticated => 401,
            Self::InvalidToken => 403,
            Self::Validation(_) => 400,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}
