//! Structural validation of the token-mint request body
//!
//! The body is only consulted when the request declares a JSON content
//! type. A missing, unparseable, or non-object body falls back to the
//! all-defaults request so a credential-only request still succeeds;
//! only a recognized field carrying an invalid value is an error.

use parlo_auth_core::FieldIssue;
use serde_json::Value;

/// Default scope when the caller does not name one
pub const DEFAULT_SCOPE: &str = "practice";

/// Largest ttl a caller may put in the body. The token engine applies
/// its own, lower ceiling afterwards.
pub const MAX_REQUESTED_TTL_SECS: i64 = 600;

/// Validated mint parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintParams {
    pub scope: String,
    pub ttl_seconds: Option<i64>,
}

impl Default for MintParams {
    fn default() -> Self {
        Self {
            scope: DEFAULT_SCOPE.to_string(),
            ttl_seconds: None,
        }
    }
}

/// Parse and validate the raw request body.
///
/// `content_type` is the raw `Content-Type` header value, if any.
/// Returns the defaults on the lenient paths (no JSON content type,
/// syntactically broken JSON, non-object JSON) and field-level issues
/// when recognized fields are present but invalid.
pub fn parse_mint_params(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<MintParams, Vec<FieldIssue>> {
    if !is_json_content_type(content_type) {
        return Ok(MintParams::default());
    }

    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return Ok(MintParams::default());
    };
    let Value::Object(fields) = value else {
        return Ok(MintParams::default());
    };

    let mut issues = Vec::new();
    let mut params = MintParams::default();

    if let Some(scope) = fields.get("scope") {
        match scope.as_str() {
            Some(s) if !s.trim().is_empty() => params.scope = s.trim().to_string(),
            Some(_) => issues.push(FieldIssue::new(
                "scope",
                "Must be a non-empty string",
            )),
            None => issues.push(FieldIssue::new("scope", "Expected a string")),
        }
    }

    if let Some(ttl) = fields.get("ttlSeconds") {
        match ttl.as_i64() {
            Some(n) if (1..=MAX_REQUESTED_TTL_SECS).contains(&n) => {
                params.ttl_seconds = Some(n);
            }
            Some(_) => issues.push(FieldIssue::new(
                "ttlSeconds",
                format!("Must be between 1 and {MAX_REQUESTED_TTL_SECS}"),
            )),
            None => issues.push(FieldIssue::new("ttlSeconds", "Expected an integer")),
        }
    }

    if issues.is_empty() {
        Ok(params)
    } else {
        Err(issues)
    }
}

/// Check whether the declared content type is JSON, ignoring parameters
/// such as `; charset=utf-8`.
fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
