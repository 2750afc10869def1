//! Parlo Session API
//!
//! Single-route microservice minting and renewing ephemeral session
//! tokens for the real-time session API.

use axum::routing::{get, post};
use axum::Router;

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod validate;

pub use config::Config;
pub use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/session-token", post(handlers::session::issue_session_token))
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .with_state(state)
}
