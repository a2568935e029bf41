//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::{ChannelStatus, StandupStatus};
use crate::value_objects::{ScheduleError, StandupId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Standup not found: {0}")]
    StandupNotFound(StandupId),

    #[error("Response not found")]
    ResponseNotFound,

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),

    #[error("At least one question is required")]
    NoQuestions,

    #[error("Too many questions: max {max}")]
    TooManyQuestions { max: usize },

    #[error("Question too long: max {max} characters")]
    QuestionTooLong { max: usize },

    #[error("Too many participants: max {max}")]
    TooManyParticipants { max: usize },

    // =========================================================================
    // Lifecycle Preconditions
    // =========================================================================
    #[error("Standup is not configured for this channel")]
    ChannelNotConfigured,

    #[error("Standups are {0} for this channel")]
    ChannelInactive(ChannelStatus),

    #[error("A standup is already active in this channel")]
    StandupAlreadyActive,

    #[error("No participants found for this standup")]
    NoParticipants,

    #[error("Standup skipped: {away} of {total} participants are away")]
    StandupSkippedAllAway { away: usize, total: usize },

    #[error("Standup is not open (status: {0})")]
    StandupNotOpen(StandupStatus),

    // =========================================================================
    // Platform Access
    // =========================================================================
    #[error("Bot can no longer access the channel ({0})")]
    BotRemoved(String),

    #[error("Chat platform error: {0}")]
    PlatformError(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Channel is already configured")]
    ChannelAlreadyConfigured,

    #[error("Response already recorded for this participant")]
    DuplicateResponse,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::StandupNotFound(_) => "UNKNOWN_STANDUP",
            Self::ResponseNotFound => "UNKNOWN_RESPONSE",
            Self::TeamNotFound(_) => "UNKNOWN_TEAM",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidSchedule(_) => "INVALID_SCHEDULE",
            Self::NoQuestions => "NO_QUESTIONS",
            Self::TooManyQuestions { .. } => "TOO_MANY_QUESTIONS",
            Self::QuestionTooLong { .. } => "QUESTION_TOO_LONG",
            Self::TooManyParticipants { .. } => "TOO_MANY_PARTICIPANTS",

            // Preconditions
            Self::ChannelNotConfigured => "CHANNEL_NOT_CONFIGURED",
            Self::ChannelInactive(_) => "CHANNEL_INACTIVE",
            Self::StandupAlreadyActive => "STANDUP_ALREADY_ACTIVE",
            Self::NoParticipants => "NO_PARTICIPANTS",
            Self::StandupSkippedAllAway { .. } => "STANDUP_SKIPPED_ALL_AWAY",
            Self::StandupNotOpen(_) => "STANDUP_NOT_OPEN",

            // Platform
            Self::BotRemoved(_) => "BOT_REMOVED",
            Self::PlatformError(_) => "PLATFORM_ERROR",

            // Conflict
            Self::ChannelAlreadyConfigured => "CHANNEL_ALREADY_CONFIGURED",
            Self::DuplicateResponse => "DUPLICATE_RESPONSE",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ChannelNotFound(_)
                | Self::StandupNotFound(_)
                | Self::ResponseNotFound
                | Self::TeamNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidSchedule(_)
                | Self::NoQuestions
                | Self::TooManyQuestions { .. }
                | Self::QuestionTooLong { .. }
                | Self::TooManyParticipants { .. }
        )
    }

    /// Check if this is an expected, user-actionable lifecycle outcome
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::ChannelNotConfigured
                | Self::ChannelInactive(_)
                | Self::StandupAlreadyActive
                | Self::NoParticipants
                | Self::StandupSkippedAllAway { .. }
                | Self::StandupNotOpen(_)
        )
    }

    /// Check if the bot lost access to the channel
    pub fn is_bot_removed(&self) -> bool {
        matches!(self, Self::BotRemoved(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ChannelAlreadyConfigured | Self::DuplicateResponse | Self::StandupAlreadyActive
        )
    }
}
