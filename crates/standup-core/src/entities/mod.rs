//! Domain entities - core business objects

mod channel;
mod response;
mod standup;
mod team;

pub use channel::{
    Channel, ChannelConfig, ChannelStats, ChannelStatus, DEFAULT_QUESTIONS, MAX_PARTICIPANTS,
    MAX_QUESTIONS, MAX_QUESTION_LENGTH, MIN_QUESTIONS,
};
pub use response::{parse_answers, Response, ResponseStats};
pub use standup::{
    AwaySnapshot, AwayUser, Mood, ReminderKind, ReminderRecord, Standup, StandupStats,
    StandupStatus, StandupSummary, SummarySource, SYSTEM_ACTOR,
};
pub use team::Team;
