//! Session token engine - minting and verification of ephemeral tokens
//!
//! Tokens are three dot-joined base64url segments (no padding): a fixed
//! header naming the algorithm, a JSON payload, and an HMAC-SHA256
//! signature over `header.payload`. The format is a compatibility
//! contract with previously issued tokens and must not change.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{HmacKey, HmacKeyError};
use crate::AuthError;

/// Default token lifetime when the caller does not request one
pub const DEFAULT_TTL_SECS: i64 = 60;

/// Hard ceiling on token lifetime; larger requests are clamped, not rejected
pub const MAX_TTL_SECS: i64 = 300;

/// Fixed token header, identical for every token this engine signs
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Signed token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    /// Unique random identifier; audit-only, not checked on verify
    pub id: String,
    /// What the token authorizes (e.g. "practice")
    pub scope: String,
    /// Creation time, seconds since epoch
    pub issued_at: i64,
    /// Expiry, seconds since epoch; invalid at or after this instant
    pub expires_at: i64,
}

impl TokenPayload {
    /// Check whether the token is expired at `now`.
    ///
    /// Expiry is exclusive at the boundary: a token with
    /// `expires_at = T` is already invalid at exactly `T`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at * 1000 <= now.timestamp_millis()
    }

    /// Expiry as a UTC timestamp, saturating on out-of-range values
    pub fn expires_at_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.expires_at, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Result of minting a token
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// Full encoded token string
    pub token: String,
    /// Scope the token was minted with
    pub scope: String,
    /// Expiry instant, for rendering as an ISO-8601 string
    pub expires_at: DateTime<Utc>,
}

/// Engine minting and verifying signed, expiring tokens.
///
/// Holds only the pre-validated signing key; the current time is an
/// explicit parameter on every operation so behavior stays
/// deterministic under test.
#[derive(Clone)]
pub struct TokenEngine {
    hmac_key: HmacKey,
}

impl TokenEngine {
    /// Create an engine for the given signing secret.
    ///
    /// # Errors
    /// Returns error if the secret is empty.
    pub fn new(signing_secret: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        Ok(Self {
            hmac_key: HmacKey::new(signing_secret)?,
        })
    }

    /// Mint a new token.
    ///
    /// `scope` must be non-empty after trimming. `ttl_seconds`, when
    /// supplied, must be positive; it is silently clamped to
    /// [`MAX_TTL_SECS`] so a caller requesting an excessive lifetime
    /// degrades gracefully instead of being rejected.
    pub fn mint(
        &self,
        scope: &str,
        ttl_seconds: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<MintedToken, AuthError> {
        let scope = scope.trim();
        if scope.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let requested = ttl_seconds.unwrap_or(DEFAULT_TTL_SECS);
        if requested <= 0 {
            return Err(AuthError::InvalidToken);
        }
        let effective_ttl = requested.min(MAX_TTL_SECS);

        let issued_at = now.timestamp();
        let payload = TokenPayload {
            id: uuid::Uuid::new_v4().to_string(),
            scope: scope.to_string(),
            issued_at,
            expires_at: issued_at + effective_ttl,
        };

        let payload_json = serde_json::to_vec(&payload).map_err(|e| {
            tracing::error!("Failed to serialize token payload: {}", e);
            AuthError::InvalidToken
        })?;

        let header_b64 = URL_SAFE_NO_PAD.encode(TOKEN_HEADER.as_bytes());
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature_b64 = URL_SAFE_NO_PAD.encode(self.hmac_key.sign(signing_input.as_bytes()));

        Ok(MintedToken {
            token: format!("{signing_input}.{signature_b64}"),
            expires_at: payload.expires_at_utc(),
            scope: payload.scope,
        })
    }

    /// Verify a token and return its decoded payload.
    ///
    /// `allowed_scopes` empty means any scope is accepted; otherwise
    /// the payload's scope must be among them. Check order is fixed:
    /// structure, then signature, then payload decoding, then expiry,
    /// then scope. Malformed or tampered tokens are always
    /// [`AuthError::InvalidToken`] before expiry is even considered.
    pub fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
        allowed_scopes: &[&str],
    ) -> Result<TokenPayload, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let parts: Vec<&str> = token.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = parts.as_slice() else {
            return Err(AuthError::InvalidToken);
        };
        if header_b64.is_empty() || payload_b64.is_empty() || signature_b64.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        // Signature check before anything is decoded from the payload
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let signing_input = format!("{header_b64}.{payload_b64}");
        if !self.hmac_key.verify(signing_input.as_bytes(), &signature) {
            tracing::debug!("Token signature mismatch");
            return Err(AuthError::InvalidToken);
        }

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let payload: TokenPayload =
            serde_json::from_slice(&payload_json).map_err(|_| AuthError::InvalidToken)?;

        if payload.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }

        if !allowed_scopes.is_empty() && !allowed_scopes.contains(&payload.scope.as_str()) {
            tracing::debug!("Token scope not among allowed scopes");
            return Err(AuthError::InvalidToken);
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "test-signing-secret";

    fn engine() -> TokenEngine {
        TokenEngine::new(SECRET).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_mint_verify_roundtrip() {
        let engine = engine();
        let now = fixed_now();

        let minted = engine.mint("practice", Some(120), now).unwrap();
        let payload = engine.verify(&minted.token, now, &[]).unwrap();

        assert_eq!(payload.scope, "practice");
        assert_eq!(payload.issued_at, now.timestamp());
        assert_eq!(payload.expires_at, now.timestamp() + 120);
        assert_eq!(minted.expires_at, payload.expires_at_utc());
    }

    #[test]
    fn test_mint_default_ttl() {
        let engine = engine();
        let now = fixed_now();

        let minted = engine.mint("practice", None, now).unwrap();
        let payload = engine.verify(&minted.token, now, &[]).unwrap();
        assert_eq!(payload.expires_at - payload.issued_at, DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_mint_clamps_excessive_ttl() {
        let engine = engine();
        let now = fixed_now();

        let minted = engine.mint("practice", Some(1000), now).unwrap();
        let payload = engine.verify(&minted.token, now, &[]).unwrap();
        assert_eq!(payload.expires_at - payload.issued_at, MAX_TTL_SECS);
    }

    #[test]
    fn test_mint_rejects_blank_scope() {
        let engine = engine();
        assert!(matches!(
            engine.mint("", None, fixed_now()),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            engine.mint("   ", None, fixed_now()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_mint_rejects_non_positive_ttl() {
        let engine = engine();
        assert!(matches!(
            engine.mint("practice", Some(0), fixed_now()),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            engine.mint("practice", Some(-5), fixed_now()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_mint_trims_scope() {
        let engine = engine();
        let minted = engine.mint("  practice  ", None, fixed_now()).unwrap();
        assert_eq!(minted.scope, "practice");
    }

    #[test]
    fn test_token_has_three_segments_and_fixed_header() {
        let engine = engine();
        let minted = engine.mint("practice", None, fixed_now()).unwrap();

        let parts: Vec<&str> = minted.token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(!minted.token.contains('='));

        let header = URL_SAFE_NO_PAD.decode(parts[0]).unwrap();
        assert_eq!(header, br#"{"alg":"HS256","typ":"JWT"}"#);
    }

    #[test]
    fn test_minted_ids_are_unique() {
        let engine = engine();
        let now = fixed_now();
        let a = engine.mint("practice", None, now).unwrap();
        let b = engine.mint("practice", None, now).unwrap();
        let pa = engine.verify(&a.token, now, &[]).unwrap();
        let pb = engine.verify(&b.token, now, &[]).unwrap();
        assert_ne!(pa.id, pb.id);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let engine = engine();
        let now = fixed_now();
        let minted = engine.mint("practice", Some(60), now).unwrap();

        // Exactly at expiry: invalid
        let at_expiry = now + chrono::Duration::seconds(60);
        assert!(matches!(
            engine.verify(&minted.token, at_expiry, &[]),
            Err(AuthError::TokenExpired)
        ));

        // One millisecond earlier: still valid
        let just_before = at_expiry - chrono::Duration::milliseconds(1);
        assert!(engine.verify(&minted.token, just_before, &[]).is_ok());
    }

    #[test]
    fn test_verify_rejects_empty_token() {
        assert!(matches!(
            engine().verify("", fixed_now(), &[]),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_segment_count() {
        let engine = engine();
        for token in ["nodots", "one.two", "a.b.c.d", "..", ".x.y"] {
            assert!(
                matches!(
                    engine.verify(token, fixed_now(), &[]),
                    Err(AuthError::InvalidToken)
                ),
                "token {token:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let engine = engine();
        let now = fixed_now();
        let minted = engine.mint("practice", Some(60), now).unwrap();

        // Re-encode a payload with an extended lifetime, keep the old signature
        let parts: Vec<&str> = minted.token.split('.').collect();
        let mut payload: TokenPayload =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        payload.expires_at += 3600;
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(
            engine.verify(&forged, now, &[]),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_any_single_byte_flip() {
        let engine = engine();
        let now = fixed_now();
        let minted = engine.mint("practice", Some(60), now).unwrap();

        let header_len = minted.token.find('.').unwrap();
        let payload_start = header_len + 1;

        // Flip one character at every position of the payload and
        // signature segments; verification must never succeed.
        for i in payload_start..minted.token.len() {
            let mut bytes = minted.token.clone().into_bytes();
            if bytes[i] == b'.' {
                continue;
            }
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            if bytes == minted.token.as_bytes() {
                continue;
            }
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                matches!(
                    engine.verify(&tampered, now, &[]),
                    Err(AuthError::InvalidToken)
                ),
                "flip at byte {i} must be rejected"
            );
        }
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let now = fixed_now();
        let minted = engine().mint("practice", None, now).unwrap();
        let other = TokenEngine::new("a-different-secret").unwrap();
        assert!(matches!(
            other.verify(&minted.token, now, &[]),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_payload_missing_fields() {
        let engine = engine();
        // Valid signature over a payload that is JSON but not payload-shaped
        let header_b64 = URL_SAFE_NO_PAD.encode(TOKEN_HEADER.as_bytes());
        let payload_b64 = URL_SAFE_NO_PAD.encode(br#"{"id":"x","scope":"practice"}"#);
        let signing_input = format!("{header_b64}.{payload_b64}");
        let sig = URL_SAFE_NO_PAD.encode(
            HmacKey::new(SECRET).unwrap().sign(signing_input.as_bytes()),
        );
        let token = format!("{signing_input}.{sig}");

        assert!(matches!(
            engine.verify(&token, fixed_now(), &[]),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_scope_enforcement() {
        let engine = engine();
        let now = fixed_now();
        let minted = engine.mint("practice", None, now).unwrap();

        // Wrong required scope
        assert!(matches!(
            engine.verify(&minted.token, now, &["lecture"]),
            Err(AuthError::InvalidToken)
        ));

        // Matching scope, alone or within a set
        assert!(engine.verify(&minted.token, now, &["practice"]).is_ok());
        assert!(engine
            .verify(&minted.token, now, &["lecture", "practice"])
            .is_ok());

        // Empty set means no restriction
        assert!(engine.verify(&minted.token, now, &[]).is_ok());
    }

    #[test]
    fn test_structure_errors_take_precedence_over_expiry() {
        let engine = engine();
        let now = fixed_now();
        let minted = engine.mint("practice", Some(1), now).unwrap();
        let long_after = now + chrono::Duration::hours(1);

        // Expired AND tampered: must surface InvalidToken, not TokenExpired
        let mut tampered = minted.token.clone();
        tampered.pop();
        tampered.push(if minted.token.ends_with('A') { 'B' } else { 'A' });
        assert!(matches!(
            engine.verify(&tampered, long_after, &[]),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expiry_takes_precedence_over_scope() {
        let engine = engine();
        let now = fixed_now();
        let minted = engine.mint("practice", Some(1), now).unwrap();
        let later = now + chrono::Duration::seconds(2);

        assert!(matches!(
            engine.verify(&minted.token, later, &["lecture"]),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_engine_rejects_empty_secret() {
        assert!(TokenEngine::new("").is_err());
    }
}
