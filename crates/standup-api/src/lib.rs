//! # standup-api
//!
//! HTTP server built with Axum: Slack slash commands, the Events API
//! endpoint, and health probes.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;
