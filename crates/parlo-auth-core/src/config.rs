//! Configuration types for the auth core
//!
//! Values are resolved once at process start from already-read
//! environment variables and injected into the gate and engine
//! constructors. Nothing in this crate reads the environment
//! mid-request.

/// Fixed development fallback signing secret.
///
/// Used only when neither a signing secret nor an app password is
/// configured, so local development works out of the box. This value
/// is public knowledge and MUST NOT be relied on in any real
/// deployment; configure a signing secret or app password instead.
pub const DEV_FALLBACK_SECRET: &str = "parlo-dev-session-secret";

/// Resolved auth configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared app password; `None` means the credential gate fails closed
    pub app_password: Option<String>,
    /// Secret used to sign and verify session tokens
    pub signing_secret: String,
}

impl AuthConfig {
    /// Resolve the configuration from optional inputs.
    ///
    /// The signing secret falls back through a fixed chain: explicit
    /// signing secret, then the app password, then
    /// [`DEV_FALLBACK_SECRET`]. Blank values count as absent.
    pub fn resolve(app_password: Option<String>, signing_secret: Option<String>) -> Self {
        let app_password = app_password.filter(|s| !s.trim().is_empty());
        let signing_secret = signing_secret
            .filter(|s| !s.trim().is_empty())
            .or_else(|| app_password.clone())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "No signing secret or app password configured; \
                     falling back to the development signing secret"
                );
                DEV_FALLBACK_SECRET.to_string()
            });

        Self {
            app_password,
            signing_secret,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("app_password_configured", &self.app_password.is_some())
            .field(
                "signing_secret_is_dev_fallback",
                &(self.signing_secret == DEV_FALLBACK_SECRET),
            )
            .finish()
    }
}
