//! Session-token handler (mint and renew)
//!
//! One POST route, terminal at the first matching branch: a Bearer
//! header is a renewal/validation request against the token engine; a
//! Basic header is a fresh-mint request through the credential gate.
//! Both branches answer with the same body shape so clients handle
//! "got a usable token" uniformly.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use parlo_auth_core::{parse_basic_credentials, AuthError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validate::parse_mint_params;

/// Response body, identical for the mint and renew branches
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenResponse {
    pub token: String,
    pub expires_at: String,
    pub scope: String,
}

/// POST /api/session-token
///
/// Issue a fresh session token against Basic credentials, or validate
/// and echo an existing one presented as a Bearer token.
pub async fn issue_session_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<SessionTokenResponse>> {
    let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Err(ApiError::Unauthorized);
    };

    if let Some(raw_token) = strip_bearer(auth_header) {
        return renew(&state, raw_token.trim());
    }

    mint(&state, auth_header, &headers, &body)
}

/// Validate a presented token and echo it back with its payload claims.
fn renew(state: &AppState, token: &str) -> ApiResult<Json<SessionTokenResponse>> {
    if token.is_empty() {
        return Err(ApiError::MissingToken);
    }

    // Verification is a bounded, synchronous computation; isolate it so
    // an unexpected panic becomes a generic 500 instead of leaking
    // internals through the boundary.
    let verified = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        state.tokens.verify(token, Utc::now(), &[])
    }))
    .map_err(|_| {
        tracing::error!("Token verification panicked");
        ApiError::Internal
    })?;

    let payload = verified.map_err(|e| {
        tracing::debug!(error = %e, "Token renewal rejected");
        match e {
            AuthError::TokenExpired => ApiError::TokenExpired,
            _ => ApiError::InvalidToken,
        }
    })?;

    Ok(Json(SessionTokenResponse {
        token: token.to_string(),
        expires_at: to_iso8601(payload.expires_at_utc()),
        scope: payload.scope,
    }))
}

/// Check Basic credentials, then mint a fresh token from the optional body.
fn mint(
    state: &AppState,
    auth_header: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<Json<SessionTokenResponse>> {
    // A parse failure and a wrong password produce the same response
    // as a missing header, so no failure mode is distinguishable.
    let authorized = parse_basic_credentials(Some(auth_header))
        .map(|creds| state.gate.verify(&creds.password))
        .unwrap_or(false);
    if !authorized {
        return Err(ApiError::Unauthorized);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let params = parse_mint_params(content_type, body).map_err(ApiError::Validation)?;

    let minted = state
        .tokens
        .mint(&params.scope, params.ttl_seconds, Utc::now())
        .map_err(|e| {
            // Validation already guarantees the mint inputs
            tracing::error!(error = %e, "Token mint failed after validation");
            ApiError::Internal
        })?;

    Ok(Json(SessionTokenResponse {
        token: minted.token,
        expires_at: to_iso8601(minted.expires_at),
        scope: minted.scope,
    }))
}

/// Strip a case-insensitive `Bearer ` scheme prefix.
fn strip_bearer(header: &str) -> Option<&str> {
    let scheme = header.get(..7)?;
    scheme.eq_ignore_ascii_case("bearer ").then(|| &header[7..])
}

fn to_iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
