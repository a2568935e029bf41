//! Data transfer objects for the HTTP surface
//!
//! This module provides:
//! - Request DTOs with validation for command inputs
//! - Response DTOs for serializing replies

pub mod requests;
pub mod responses;

pub use requests::ChannelConfigInput;
pub use responses::{CommandReply, HealthChecks, HealthResponse, ReadinessResponse, ResponseType};
