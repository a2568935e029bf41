//! # standup-service
//!
//! Application layer: the standup engines, the scheduler driver, the
//! summarizer clients, and the DTOs the HTTP layer speaks.

pub mod dto;
pub mod services;
pub mod summarizer;

pub use dto::*;
pub use services::*;
