//! Configuration for the Session API service.

use parlo_auth_core::AuthConfig;

/// Session API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Resolved auth configuration
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // The app password gates minting; without it the credential
        // gate fails closed but the service still serves renewals.
        let app_password = std::env::var("APP_PASSWORD").ok();

        // Distinct token-signing secret; falls back to the app
        // password, then to the development default.
        let signing_secret = std::env::var("SESSION_TOKEN_SECRET").ok();

        Ok(Self {
            http_port,
            auth: AuthConfig::resolve(app_password, signing_secret),
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
