//! Entity to model mappers
//!
//! This module provides conversions between domain entities (standup-core) and database models.
//! - `From<Model> for Entity` / `TryFrom`: Convert database rows to domain objects
//! - `ChannelValues`: Prepare derived column values for database writes

mod channel;
mod response;
mod standup;
mod team;

pub use channel::ChannelValues;
