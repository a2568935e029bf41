//! Database models - SQLx-compatible structs for PostgreSQL tables

mod channel;
mod response;
mod standup;
mod team;

pub use channel::ChannelModel;
pub use response::ResponseModel;
pub use standup::{IdRow, StandupModel};
pub use team::TeamModel;
