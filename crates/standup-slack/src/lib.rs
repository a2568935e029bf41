//! # standup-slack
//!
//! Slack integration: a Web API client implementing the `ChatPlatform`
//! port, request signature verification, and the Events API / slash
//! command payload types.

pub mod client;
pub mod events;
pub mod signing;
mod types;

pub use client::SlackClient;
pub use events::{Authorization, EventCallback, EventPayload, MessageEvent, RenamedChannel, SlackEvent, SlashCommand};
pub use signing::{compute_signature, verify_signature, SignatureError, MAX_REQUEST_AGE_SECS};
