//! In-memory repositories
//!
//! Mirror the PostgreSQL query semantics closely enough for the engines:
//! open means active/collecting, ordering follows the SQL `ORDER BY`
//! clauses, and uniqueness violations map to the same domain errors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use standup_core::{
    Channel, ChannelRepository, ChannelStatus, DomainError, RepoResult, Response, ResponseRepository, Standup,
    StandupId, StandupRepository, StandupStatus, Team, TeamRepository,
};

/// Counts down injected failures; each call consumes one
#[derive(Debug, Default)]
struct FailureBudget(AtomicUsize);

impl FailureBudget {
    fn arm(&self, times: usize) {
        self.0.store(times, Ordering::SeqCst);
    }

    fn take(&self) -> RepoResult<()> {
        let armed = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            Err(DomainError::InternalError("db outage".into()))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Channels
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryChannelRepository {
    channels: Mutex<HashMap<(String, String), Channel>>,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored copy, bypassing the async trait
    pub fn get(&self, team_id: &str, channel_id: &str) -> Option<Channel> {
        self.channels
            .lock()
            .get(&(team_id.to_string(), channel_id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn find(&self, team_id: &str, channel_id: &str) -> RepoResult<Option<Channel>> {
        Ok(self.get(team_id, channel_id))
    }

    async fn find_by_team(&self, team_id: &str) -> RepoResult<Vec<Channel>> {
        let mut channels: Vec<Channel> = self
            .channels
            .lock()
            .values()
            .filter(|c| c.team_id == team_id)
            .cloned()
            .collect();
        channels.sort_by_key(|c| c.created_at);
        Ok(channels)
    }

    async fn find_scheduled_on(&self, weekdays: &[u8]) -> RepoResult<Vec<Channel>> {
        Ok(self
            .channels
            .lock()
            .values()
            .filter(|c| c.is_active && c.status == ChannelStatus::Active)
            .filter(|c| weekdays.iter().any(|d| c.config.schedule.runs_on(*d)))
            .cloned()
            .collect())
    }

    async fn create(&self, channel: &Channel) -> RepoResult<()> {
        let key = (channel.team_id.clone(), channel.channel_id.clone());
        let mut channels = self.channels.lock();
        if channels.contains_key(&key) {
            return Err(DomainError::ChannelAlreadyConfigured);
        }
        channels.insert(key, channel.clone());
        Ok(())
    }

    async fn update(&self, channel: &Channel) -> RepoResult<()> {
        let key = (channel.team_id.clone(), channel.channel_id.clone());
        let mut channels = self.channels.lock();
        match channels.get_mut(&key) {
            Some(existing) => {
                *existing = channel.clone();
                Ok(())
            }
            None => Err(DomainError::ChannelNotFound(channel.channel_id.clone())),
        }
    }

    async fn delete(&self, team_id: &str, channel_id: &str) -> RepoResult<()> {
        self.channels
            .lock()
            .remove(&(team_id.to_string(), channel_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| DomainError::ChannelNotFound(channel_id.to_string()))
    }
}

// ============================================================================
// Standups
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryStandupRepository {
    standups: Mutex<HashMap<StandupId, Standup>>,
    save_failures: FailureBudget,
}

impl InMemoryStandupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: StandupId) -> Option<Standup> {
        self.standups.lock().get(&id).cloned()
    }

    /// Every stored standup, oldest first
    pub fn all(&self) -> Vec<Standup> {
        let mut standups: Vec<Standup> = self.standups.lock().values().cloned().collect();
        standups.sort_by_key(|s| s.started_at);
        standups
    }

    /// Store a standup as-is, e.g. one backdated for retention tests
    pub fn insert(&self, standup: Standup) {
        self.standups.lock().insert(standup.id, standup);
    }

    /// Make the next `times` saves fail
    pub fn fail_saves(&self, times: usize) {
        self.save_failures.arm(times);
    }

    fn select(&self, filter: impl Fn(&Standup) -> bool) -> Vec<Standup> {
        self.standups.lock().values().filter(|s| filter(s)).cloned().collect()
    }
}

#[async_trait]
impl StandupRepository for InMemoryStandupRepository {
    async fn find_by_id(&self, id: StandupId) -> RepoResult<Option<Standup>> {
        Ok(self.get(id))
    }

    async fn find_by_thread_ts(&self, team_id: &str, thread_ts: &str) -> RepoResult<Option<Standup>> {
        Ok(self
            .select(|s| s.team_id == team_id && s.thread_ts.as_deref() == Some(thread_ts))
            .into_iter()
            .next())
    }

    async fn find_active(&self, team_id: &str, channel_id: &str) -> RepoResult<Vec<Standup>> {
        let mut active = self.select(|s| s.team_id == team_id && s.channel_id == channel_id && s.is_open());
        active.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(active)
    }

    async fn find_recent(&self, team_id: &str, channel_id: &str, limit: i64) -> RepoResult<Vec<Standup>> {
        let mut recent = self.select(|s| s.team_id == team_id && s.channel_id == channel_id);
        recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        recent.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(recent)
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> RepoResult<Vec<Standup>> {
        let mut expired = self.select(|s| s.is_open() && s.response_deadline < now);
        expired.sort_by_key(|s| s.response_deadline);
        Ok(expired)
    }

    async fn find_reminders_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<Standup>> {
        let mut due = self.select(|s| s.is_open() && s.next_reminder_at.is_some_and(|at| at <= now));
        due.sort_by_key(|s| s.next_reminder_at);
        Ok(due)
    }

    async fn has_started_since(&self, team_id: &str, channel_id: &str, since: DateTime<Utc>) -> RepoResult<bool> {
        Ok(!self
            .select(|s| s.team_id == team_id && s.channel_id == channel_id && s.started_at >= since)
            .is_empty())
    }

    async fn find_terminal_before(&self, cutoff: DateTime<Utc>, limit: i64) -> RepoResult<Vec<StandupId>> {
        let mut terminal = self.select(|s| s.is_terminal() && s.started_at < cutoff);
        terminal.sort_by_key(|s| s.started_at);
        terminal.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(terminal.into_iter().map(|s| s.id).collect())
    }

    async fn find_stalled_analysis(&self, before: DateTime<Utc>) -> RepoResult<Vec<Standup>> {
        let mut stalled = self.select(|s| s.status == StandupStatus::Analyzing && s.updated_at < before);
        stalled.sort_by_key(|s| s.updated_at);
        Ok(stalled)
    }

    async fn create(&self, standup: &Standup) -> RepoResult<()> {
        let mut standups = self.standups.lock();
        if standups.contains_key(&standup.id) {
            return Err(DomainError::ValidationError(format!("duplicate standup id {}", standup.id)));
        }
        standups.insert(standup.id, standup.clone());
        Ok(())
    }

    async fn save(&self, standup: &Standup) -> RepoResult<bool> {
        self.save_failures.take()?;
        let mut standups = self.standups.lock();
        if let Some(stored) = standups.get(&standup.id) {
            if !stored.status.accepts_write(standup.status) {
                return Ok(false);
            }
        }
        standups.insert(standup.id, standup.clone());
        Ok(true)
    }

    async fn transition(
        &self,
        id: StandupId,
        from: &[StandupStatus],
        to: StandupStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        match self.standups.lock().get_mut(&id) {
            Some(stored) if from.contains(&stored.status) => {
                stored.status = to;
                stored.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: StandupId) -> RepoResult<()> {
        self.standups
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::StandupNotFound(id))
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryResponseRepository {
    responses: Mutex<Vec<Response>>,
    list_failures: FailureBudget,
}

impl InMemoryResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_standup(&self, standup_id: StandupId) -> Vec<Response> {
        self.responses
            .lock()
            .iter()
            .filter(|r| r.standup_id == standup_id)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.responses.lock().len()
    }

    pub fn insert(&self, response: Response) {
        self.responses.lock().push(response);
    }

    /// Make the next `times` per-standup listings fail
    pub fn fail_listings(&self, times: usize) {
        self.list_failures.arm(times);
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponseRepository {
    async fn find(&self, standup_id: StandupId, user_id: &str) -> RepoResult<Option<Response>> {
        Ok(self
            .responses
            .lock()
            .iter()
            .find(|r| r.standup_id == standup_id && r.user_id == user_id)
            .cloned())
    }

    async fn find_by_standup(&self, standup_id: StandupId) -> RepoResult<Vec<Response>> {
        self.list_failures.take()?;
        let mut responses = self.for_standup(standup_id);
        responses.sort_by_key(|r| r.submitted_at);
        Ok(responses)
    }

    async fn find_recent_by_user(&self, team_id: &str, user_id: &str, limit: i64) -> RepoResult<Vec<Response>> {
        let mut responses: Vec<Response> = self
            .responses
            .lock()
            .iter()
            .filter(|r| r.team_id == team_id && r.user_id == user_id)
            .cloned()
            .collect();
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        responses.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(responses)
    }

    async fn create(&self, response: &Response) -> RepoResult<()> {
        let mut responses = self.responses.lock();
        if responses
            .iter()
            .any(|r| r.standup_id == response.standup_id && r.user_id == response.user_id)
        {
            return Err(DomainError::DuplicateResponse);
        }
        responses.push(response.clone());
        Ok(())
    }

    async fn update(&self, response: &Response) -> RepoResult<()> {
        let mut responses = self.responses.lock();
        match responses.iter_mut().find(|r| r.id == response.id) {
            Some(existing) => {
                *existing = response.clone();
                Ok(())
            }
            None => Err(DomainError::ResponseNotFound),
        }
    }

    async fn delete_by_standup(&self, standup_id: StandupId) -> RepoResult<u64> {
        let mut responses = self.responses.lock();
        let before = responses.len();
        responses.retain(|r| r.standup_id != standup_id);
        Ok((before - responses.len()) as u64)
    }
}

// ============================================================================
// Teams
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    teams: Mutex<HashMap<String, Team>>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, team_id: &str) -> Option<Team> {
        self.teams.lock().get(team_id).cloned()
    }

    pub fn insert(&self, team: Team) {
        self.teams.lock().insert(team.team_id.clone(), team);
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn find(&self, team_id: &str) -> RepoResult<Option<Team>> {
        Ok(self.get(team_id))
    }

    async fn upsert(&self, team: &Team) -> RepoResult<()> {
        self.teams.lock().insert(team.team_id.clone(), team.clone());
        Ok(())
    }
}
