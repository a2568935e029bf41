//! Standup entity - one run of check-in questions and its collected progress
//!
//! Status is a closed state machine:
//!
//! ```text
//! scheduled -> active -> (collecting) -> analyzing -> completed
//!                 \                                 -> cancelled
//! ```
//!
//! `Expired` is kept for stored records only; expiry triggers completion.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::StandupId;

/// Actor id recorded for scheduler-triggered standups
pub const SYSTEM_ACTOR: &str = "system";

/// Standup status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StandupStatus {
    Scheduled,
    #[default]
    Active,
    Collecting,
    Analyzing,
    Completed,
    Cancelled,
    Expired,
}

impl StandupStatus {
    /// Statuses in which responses are still accepted
    pub const OPEN: [StandupStatus; 2] = [Self::Active, Self::Collecting];

    /// Statuses that are eligible for retention cleanup
    pub const TERMINAL: [StandupStatus; 3] = [Self::Completed, Self::Cancelled, Self::Expired];

    /// Get the persisted string value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Collecting => "collecting",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Accepting responses
    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Active | Self::Collecting)
    }

    /// No further transitions allowed
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// Whether a stored row in this status may be overwritten by a copy in
    /// `incoming` status
    ///
    /// Terminal rows only accept their own status; analyzing rows only move
    /// forward to a terminal status.
    #[must_use]
    pub fn accepts_write(self, incoming: StandupStatus) -> bool {
        if self == incoming {
            return true;
        }
        match self {
            Self::Completed | Self::Cancelled | Self::Expired => false,
            Self::Analyzing => incoming.is_terminal(),
            Self::Scheduled | Self::Active | Self::Collecting => true,
        }
    }
}

impl From<&str> for StandupStatus {
    fn from(value: &str) -> Self {
        match value {
            "scheduled" => Self::Scheduled,
            "active" => Self::Active,
            "collecting" => Self::Collecting,
            "analyzing" => Self::Analyzing,
            "completed" => Self::Completed,
            "expired" => Self::Expired,
            _ => Self::Cancelled, // Unknown values are treated as inert
        }
    }
}

impl std::fmt::Display for StandupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress counters for a standup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandupStats {
    pub total_expected: u32,
    pub total_responded: u32,
    /// Percentage in 0..=100
    pub response_rate: f64,
    pub avg_response_time_ms: Option<i64>,
    pub reminders_sent: u32,
}

impl StandupStats {
    /// Recompute the response rate from the counters
    pub fn refresh_rate(&mut self) {
        self.response_rate = if self.total_expected > 0 {
            f64::from(self.total_responded) / f64::from(self.total_expected) * 100.0
        } else {
            0.0
        };
    }
}

/// How a reminder was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    /// In-thread mention of everyone still missing
    Channel,
    /// Direct message to one participant
    Dm,
}

/// A reminder that was delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub kind: ReminderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// A participant excluded at creation because they were away
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwayUser {
    pub user_id: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Who was excluded as away when the standup was created
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AwaySnapshot {
    pub total_original: u32,
    pub away_users: Vec<AwayUser>,
}

impl AwaySnapshot {
    /// Number of participants excluded
    pub fn away_count(&self) -> usize {
        self.away_users.len()
    }
}

/// Overall tone reported by the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Mood {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// Where a summary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Ai,
    Fallback,
}

/// Generated summary attached at completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupSummary {
    pub text: String,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub mood: Mood,
    pub generated_by: SummarySource,
    pub generated_at: DateTime<Utc>,
}

impl StandupSummary {
    /// Whether the summary was produced without the summarizer
    pub fn is_fallback(&self) -> bool {
        self.generated_by == SummarySource::Fallback
    }
}

/// Standup entity
#[derive(Debug, Clone, PartialEq)]
pub struct Standup {
    pub id: StandupId,
    pub team_id: String,
    pub channel_id: String,
    pub status: StandupStatus,
    /// Copied from the channel at creation; channel edits never reach an open standup
    pub questions: Vec<String>,
    pub expected_participants: Vec<String>,
    pub actual_participants: Vec<String>,
    pub created_by: String,
    pub is_manual: bool,
    pub scheduled_date: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub response_deadline: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub message_ts: Option<String>,
    pub thread_ts: Option<String>,
    pub summary_message_ts: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancel_reason: Option<String>,
    pub stats: StandupStats,
    pub reminders: Vec<ReminderRecord>,
    pub next_reminder_at: Option<DateTime<Utc>>,
    pub away: AwaySnapshot,
    pub summary: Option<StandupSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Standup {
    /// Create an active standup with a snapshot of questions and participants
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        team_id: impl Into<String>,
        channel_id: impl Into<String>,
        questions: Vec<String>,
        expected_participants: Vec<String>,
        created_by: impl Into<String>,
        is_manual: bool,
        now: DateTime<Utc>,
        response_timeout: Duration,
    ) -> Self {
        let stats = StandupStats {
            total_expected: expected_participants.len() as u32,
            ..StandupStats::default()
        };
        Self {
            id: StandupId::generate(),
            team_id: team_id.into(),
            channel_id: channel_id.into(),
            status: StandupStatus::Active,
            questions,
            expected_participants,
            actual_participants: Vec::new(),
            created_by: created_by.into(),
            is_manual,
            scheduled_date: now,
            started_at: now,
            response_deadline: now + response_timeout,
            completed_at: None,
            message_ts: None,
            thread_ts: None,
            summary_message_ts: None,
            cancelled_by: None,
            cancel_reason: None,
            stats,
            reminders: Vec::new(),
            next_reminder_at: None,
            away: AwaySnapshot::default(),
            summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the away snapshot taken during creation
    pub fn with_away(mut self, away: AwaySnapshot) -> Self {
        self.away = away;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Everyone expected has answered
    pub fn has_all_responses(&self) -> bool {
        self.stats.total_responded >= self.stats.total_expected
    }

    /// The response window has closed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.response_deadline
    }

    /// Check whether a user is in the expected participant snapshot
    pub fn is_expected(&self, user_id: &str) -> bool {
        self.expected_participants.iter().any(|p| p == user_id)
    }

    /// Check whether a user has already answered
    pub fn has_responded(&self, user_id: &str) -> bool {
        self.actual_participants.iter().any(|p| p == user_id)
    }

    /// Expected participants who have not answered, in expected order
    pub fn missing_participants(&self) -> Vec<String> {
        let answered: HashSet<&str> = self.actual_participants.iter().map(String::as_str).collect();
        self.expected_participants
            .iter()
            .filter(|p| !answered.contains(p.as_str()))
            .cloned()
            .collect()
    }

    /// Record a first response; returns false if the user was already counted
    pub fn record_participant(&mut self, user_id: &str, now: DateTime<Utc>) -> bool {
        if self.has_responded(user_id) {
            return false;
        }
        self.actual_participants.push(user_id.to_string());
        self.stats.total_responded = self.actual_participants.len() as u32;
        self.stats.refresh_rate();
        self.updated_at = now;
        true
    }

    /// Record a delivered reminder
    pub fn record_reminder(&mut self, kind: ReminderKind, user_id: Option<String>, now: DateTime<Utc>) {
        self.reminders.push(ReminderRecord {
            kind,
            user_id,
            sent_at: now,
        });
        self.stats.reminders_sent += 1;
        self.updated_at = now;
    }

    /// Response rate rounded to a whole percent
    pub fn response_rate_rounded(&self) -> u32 {
        self.stats.response_rate.round() as u32
    }

    /// Time from start until completion, or until `now` while running
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.completed_at.unwrap_or(now) - self.started_at
    }

    /// Time left before the deadline, floored at zero
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.response_deadline - now).max(Duration::zero())
    }

    /// Record the platform identifiers of the posted prompt
    pub fn mark_posted(&mut self, ts: impl Into<String>, now: DateTime<Utc>) {
        let ts = ts.into();
        self.thread_ts = Some(ts.clone());
        self.message_ts = Some(ts);
        self.updated_at = now;
    }

    /// Enter the transient summarization state
    pub fn begin_analysis(&mut self, now: DateTime<Utc>) {
        self.status = StandupStatus::Analyzing;
        self.next_reminder_at = None;
        self.updated_at = now;
    }

    /// Enter the terminal completed state
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = StandupStatus::Completed;
        self.completed_at = Some(now);
        self.next_reminder_at = None;
        self.updated_at = now;
    }

    /// Enter the terminal cancelled state
    pub fn cancel(&mut self, actor: impl Into<String>, reason: impl Into<String>, now: DateTime<Utc>) {
        self.status = StandupStatus::Cancelled;
        self.cancelled_by = Some(actor.into());
        self.cancel_reason = Some(reason.into());
        self.completed_at = Some(now);
        self.next_reminder_at = None;
        self.updated_at = now;
    }
}
