//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use standup_core::error::DomainError;
use standup_core::value_objects::StandupId;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "channel not found" error
pub fn channel_not_found(team_id: &str, channel_id: &str) -> DomainError {
    DomainError::ChannelNotFound(format!("{team_id}/{channel_id}"))
}

/// Create a "standup not found" error
pub fn standup_not_found(id: StandupId) -> DomainError {
    DomainError::StandupNotFound(id)
}

/// Create a "response not found" error
pub fn response_not_found() -> DomainError {
    DomainError::ResponseNotFound
}
