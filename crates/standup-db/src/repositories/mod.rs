//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in standup-core.
//! Each repository handles database operations for a specific domain entity.

mod channel;
mod error;
mod response;
mod standup;
mod team;

pub use channel::PgChannelRepository;
pub use response::PgResponseRepository;
pub use standup::PgStandupRepository;
pub use team::PgTeamRepository;
