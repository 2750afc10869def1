//! Application state

use std::sync::Arc;

use parlo_auth_core::{AuthConfig, CredentialGate, HmacKeyError, TokenEngine};

/// Application state shared across handlers.
///
/// Everything here is read-only after startup; requests share it
/// without coordination.
#[derive(Clone)]
pub struct AppState {
    /// Gate validating the shared app password
    pub gate: Arc<CredentialGate>,
    /// Engine minting and verifying session tokens
    pub tokens: Arc<TokenEngine>,
}

impl AppState {
    /// Create new application state from resolved auth configuration
    pub fn new(auth: AuthConfig) -> Result<Self, HmacKeyError> {
        Ok(Self {
            gate: Arc::new(CredentialGate::new(auth.app_password)),
            tokens: Arc::new(TokenEngine::new(auth.signing_secret)?),
        })
    }
}
