//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every engine entry point re-reads through
//! these ports; nothing is cached between calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Channel, Response, Standup, StandupStatus, Team};
use crate::error::DomainError;
use crate::value_objects::StandupId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Find channel config by (team, channel)
    async fn find(&self, team_id: &str, channel_id: &str) -> RepoResult<Option<Channel>>;

    /// List all configured channels of a team
    async fn find_by_team(&self, team_id: &str) -> RepoResult<Vec<Channel>>;

    /// List active channels scheduled on any of the given weekdays
    async fn find_scheduled_on(&self, weekdays: &[u8]) -> RepoResult<Vec<Channel>>;

    /// Create a new channel config; fails on duplicate (team, channel)
    async fn create(&self, channel: &Channel) -> RepoResult<()>;

    /// Update an existing channel config by (team, channel)
    async fn update(&self, channel: &Channel) -> RepoResult<()>;

    /// Delete a channel config
    async fn delete(&self, team_id: &str, channel_id: &str) -> RepoResult<()>;
}

// ============================================================================
// Standup Repository
// ============================================================================

#[async_trait]
pub trait StandupRepository: Send + Sync {
    /// Find standup by ID
    async fn find_by_id(&self, id: StandupId) -> RepoResult<Option<Standup>>;

    /// Find the standup whose prompt started the given thread
    async fn find_by_thread_ts(&self, team_id: &str, thread_ts: &str) -> RepoResult<Option<Standup>>;

    /// List open (active/collecting) standups of a channel
    async fn find_active(&self, team_id: &str, channel_id: &str) -> RepoResult<Vec<Standup>>;

    /// List a channel's most recent standups, newest first
    async fn find_recent(&self, team_id: &str, channel_id: &str, limit: i64) -> RepoResult<Vec<Standup>>;

    /// List open standups whose deadline has passed
    async fn find_expired(&self, now: DateTime<Utc>) -> RepoResult<Vec<Standup>>;

    /// List open standups whose next reminder is due
    async fn find_reminders_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<Standup>>;

    /// Check whether a channel has a standup started at or after `since`
    async fn has_started_since(&self, team_id: &str, channel_id: &str, since: DateTime<Utc>) -> RepoResult<bool>;

    /// List ids of terminal standups started before `cutoff`
    async fn find_terminal_before(&self, cutoff: DateTime<Utc>, limit: i64) -> RepoResult<Vec<StandupId>>;

    /// List analyzing standups last touched before `before`
    async fn find_stalled_analysis(&self, before: DateTime<Utc>) -> RepoResult<Vec<Standup>>;

    /// Create a new standup
    async fn create(&self, standup: &Standup) -> RepoResult<()>;

    /// Save a standup (upsert by id)
    ///
    /// Returns false when the stored row's status does not accept the write
    /// (see [`StandupStatus::accepts_write`]); the row is left untouched.
    async fn save(&self, standup: &Standup) -> RepoResult<bool>;

    /// Move a standup to `to` only if its stored status is one of `from`
    ///
    /// Returns whether the row changed.
    async fn transition(
        &self,
        id: StandupId,
        from: &[StandupStatus],
        to: StandupStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Delete a standup
    async fn delete(&self, id: StandupId) -> RepoResult<()>;
}

// ============================================================================
// Response Repository
// ============================================================================

#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Find a participant's response to a standup
    async fn find(&self, standup_id: StandupId, user_id: &str) -> RepoResult<Option<Response>>;

    /// List all responses to a standup in submission order
    async fn find_by_standup(&self, standup_id: StandupId) -> RepoResult<Vec<Response>>;

    /// List a user's most recent responses in a team, newest first
    async fn find_recent_by_user(&self, team_id: &str, user_id: &str, limit: i64) -> RepoResult<Vec<Response>>;

    /// Create a response; fails with `DuplicateResponse` on (standup, user) conflict
    async fn create(&self, response: &Response) -> RepoResult<()>;

    /// Update an existing response
    async fn update(&self, response: &Response) -> RepoResult<()>;

    /// Delete all responses of a standup, returning the number removed
    async fn delete_by_standup(&self, standup_id: StandupId) -> RepoResult<u64>;
}

// ============================================================================
// Team Repository
// ============================================================================

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Find team by platform id
    async fn find(&self, team_id: &str) -> RepoResult<Option<Team>>;

    /// Insert or update a team
    async fn upsert(&self, team: &Team) -> RepoResult<()>;
}
