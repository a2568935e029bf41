//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{commands, events, health};
use crate::state::AppState;

/// Slack-facing routes (rate limited)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/slack", slack_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn slack_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(events::handle_events))
        .route("/commands", post(commands::handle_command))
}
