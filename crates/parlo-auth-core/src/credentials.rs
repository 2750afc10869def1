//! Credential gate - shared app password verification
//!
//! Validates the single shared application password presented via HTTP
//! Basic credentials. All parse failures collapse into "no credentials"
//! so callers cannot distinguish a malformed header from a wrong password.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::crypto::constant_time_str_eq;

/// Credential pair decoded from a `Basic` Authorization header.
///
/// The username is decoded but carries no authorization meaning.
/// Never persisted, never logged.
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parse an `Authorization` header value into Basic credentials.
///
/// Recognizes only the `Basic` scheme (case-insensitive). The base64
/// payload is split on the first colon, so passwords may themselves
/// contain colons.
///
/// Returns `None` (not an error) when the header is absent, uses a
/// different scheme, carries invalid base64 or non-UTF-8 bytes, or
/// lacks a colon separator. Callers must treat `None` the same way
/// they treat a wrong password.
pub fn parse_basic_credentials(header: Option<&str>) -> Option<BasicCredentials> {
    let header = header?.trim();

    let (scheme, encoded) = header.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    let (username, password) = decoded.split_once(':')?;

    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Gate holding the configured shared app password.
#[derive(Clone)]
pub struct CredentialGate {
    app_password: Option<String>,
}

impl CredentialGate {
    /// Create a gate for the configured app password.
    ///
    /// `None` means no password is configured; the gate then fails
    /// closed and no candidate can ever pass.
    pub fn new(app_password: Option<String>) -> Self {
        Self { app_password }
    }

    /// Verify a candidate password against the configured secret.
    ///
    /// Returns `false` (never errors) when no password is configured
    /// or when the candidate differs. The comparison consults every
    /// byte of both operands regardless of where they first differ,
    /// including for length-mismatched inputs.
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(secret) = self.app_password.as_deref() else {
            return false;
        };
        constant_time_str_eq(candidate, secret)
    }
}

impl std::fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGate")
            .field("configured", &self.app_password.is_some())
            .finish_non_exhaustive()
    }
}
