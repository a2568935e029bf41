//! # standup-core
//!
//! Domain layer containing the standup entities, value objects, and the
//! ports (repositories, chat platform, summarizer, clock) the engines consume.
//! This crate has zero dependencies on infrastructure (database, HTTP, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    parse_answers, AwaySnapshot, AwayUser, Channel, ChannelConfig, ChannelStats, ChannelStatus,
    Mood, ReminderKind, ReminderRecord, Response, ResponseStats, Standup, StandupStats,
    StandupStatus, StandupSummary, SummarySource, Team, DEFAULT_QUESTIONS, MAX_PARTICIPANTS,
    MAX_QUESTIONS, MAX_QUESTION_LENGTH, MIN_QUESTIONS, SYSTEM_ACTOR,
};
pub use error::DomainError;
pub use traits::{
    Analysis, ChannelInfo, ChannelRepository, ChatPlatform, Clock, OutgoingMessage, PlatformError,
    PlatformResult, PostedMessage, RepoResult, ResponseRepository, StandupRepository, Summarizer,
    SummarizerError, SystemClock, TeamRepository, UserProfile, BOT_REMOVED_CODES,
};
pub use value_objects::{
    parse_timezone, IdParseError, ResponseId, Schedule, ScheduleError, StandupId, TimeOfDay,
    WEEKDAY_NAMES,
};
