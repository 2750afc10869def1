//! Parlo Auth Core - session-token issuance and verification
//!
//! Gates access to the real-time session API behind a single shared
//! app password and mints short-lived, scope-bound session tokens.
//! Fully stateless: validity is determined by cryptographic signature
//! and embedded expiry, never by a server-side record.

pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod token;

pub use config::{AuthConfig, DEV_FALLBACK_SECRET};
pub use credentials::{parse_basic_credentials, BasicCredentials, CredentialGate};
pub use crypto::{constant_time_eq, constant_time_str_eq, HmacKey, HmacKeyError};
pub use error::{AuthError, FieldIssue};
pub use token::{MintedToken, TokenEngine, TokenPayload, DEFAULT_TTL_SECS, MAX_TTL_SECS};
