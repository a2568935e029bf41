//! Channel entity - a standup configuration bound to one (team, channel) pair

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Schedule;

/// Questions used when a channel is configured without its own list
pub const DEFAULT_QUESTIONS: [&str; 3] = [
    "What did you accomplish yesterday?",
    "What are you working on today?",
    "Any blockers or challenges?",
];

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 10;
pub const MAX_QUESTION_LENGTH: usize = 200;
pub const MAX_PARTICIPANTS: usize = 100;

/// Configuration status of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    #[default]
    Active,
    Paused,
    Disabled,
}

impl ChannelStatus {
    /// Get the persisted string value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Disabled => "disabled",
        }
    }
}

impl From<&str> for ChannelStatus {
    fn from(value: &str) -> Self {
        match value {
            "active" => Self::Active,
            "paused" => Self::Paused,
            _ => Self::Disabled, // Unknown values never run
        }
    }
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standup configuration for a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub questions: Vec<String>,
    pub schedule: Schedule,
    /// Explicit participant ids; empty means every channel member
    pub participants: Vec<String>,
    pub response_timeout: Duration,
    pub reminder_interval: Duration,
    pub enable_reminders: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            questions: DEFAULT_QUESTIONS.iter().map(ToString::to_string).collect(),
            schedule: Schedule::default(),
            participants: Vec::new(),
            response_timeout: Duration::hours(3),
            reminder_interval: Duration::hours(1),
            enable_reminders: true,
        }
    }
}

impl ChannelConfig {
    /// Check question, participant, and duration limits
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.questions.len() < MIN_QUESTIONS {
            return Err(DomainError::NoQuestions);
        }
        if self.questions.len() > MAX_QUESTIONS {
            return Err(DomainError::TooManyQuestions { max: MAX_QUESTIONS });
        }
        if self.questions.iter().any(|q| q.trim().is_empty()) {
            return Err(DomainError::ValidationError(
                "Questions must not be empty".to_string(),
            ));
        }
        if self.questions.iter().any(|q| q.chars().count() > MAX_QUESTION_LENGTH) {
            return Err(DomainError::QuestionTooLong {
                max: MAX_QUESTION_LENGTH,
            });
        }
        if self.participants.len() > MAX_PARTICIPANTS {
            return Err(DomainError::TooManyParticipants {
                max: MAX_PARTICIPANTS,
            });
        }
        if self.response_timeout <= Duration::zero() {
            return Err(DomainError::ValidationError(
                "Response timeout must be positive".to_string(),
            ));
        }
        if self.reminder_interval <= Duration::zero() {
            return Err(DomainError::ValidationError(
                "Reminder interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Timezone the schedule is expressed in
    pub fn timezone(&self) -> Tz {
        self.schedule.timezone
    }
}

/// Running statistics across a channel's standups
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelStats {
    pub total_standups: u32,
    pub last_standup_at: Option<DateTime<Utc>>,
    pub avg_response_rate: f64,
    pub avg_response_time_ms: Option<i64>,
}

/// Channel entity
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub team_id: String,
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub configured_by: String,
    pub config: ChannelConfig,
    pub status: ChannelStatus,
    pub is_active: bool,
    pub stats: ChannelStats,
    pub disabled_at: Option<DateTime<Utc>>,
    pub disabled_reason: Option<String>,
    pub auto_disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Channel {
    /// Create a newly configured, active channel
    pub fn new(
        team_id: impl Into<String>,
        channel_id: impl Into<String>,
        configured_by: impl Into<String>,
        config: ChannelConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            channel_id: channel_id.into(),
            channel_name: None,
            configured_by: configured_by.into(),
            config,
            status: ChannelStatus::Active,
            is_active: true,
            stats: ChannelStats::default(),
            disabled_at: None,
            disabled_reason: None,
            auto_disabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }

    /// Check whether standups may be started in this channel
    #[inline]
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        self.is_active && self.status == ChannelStatus::Active
    }

    /// Check whether the schedule says a standup starts at `now`
    pub fn is_time_for_standup(&self, now: DateTime<Utc>) -> bool {
        self.is_runnable() && self.config.schedule.is_due(now)
    }

    /// Whether participants are restricted to an explicit list
    #[inline]
    pub fn has_explicit_participants(&self) -> bool {
        !self.config.participants.is_empty()
    }

    /// Replace the configuration
    pub fn reconfigure(&mut self, config: ChannelConfig, actor: impl Into<String>, now: DateTime<Utc>) {
        self.config = config;
        self.configured_by = actor.into();
        self.updated_at = now;
    }

    /// Record that a standup was posted
    pub fn increment_standup_count(&mut self, now: DateTime<Utc>) {
        self.stats.total_standups += 1;
        self.stats.last_standup_at = Some(now);
        self.updated_at = now;
    }

    /// Fold a completed standup's response rate and average time into the running averages
    pub fn record_completion(&mut self, response_rate: f64, avg_response_time_ms: Option<i64>, now: DateTime<Utc>) {
        let n = f64::from(self.stats.total_standups.max(1));
        self.stats.avg_response_rate = (self.stats.avg_response_rate * (n - 1.0) + response_rate) / n;

        if let Some(time) = avg_response_time_ms {
            self.stats.avg_response_time_ms = Some(match self.stats.avg_response_time_ms {
                Some(avg) => ((avg as f64 * (n - 1.0) + time as f64) / n).round() as i64,
                None => time,
            });
        }
        self.updated_at = now;
    }

    /// Remove a user from the explicit participant list; returns whether it changed
    pub fn remove_participant(&mut self, user_id: &str, now: DateTime<Utc>) -> bool {
        let before = self.config.participants.len();
        self.config.participants.retain(|p| p != user_id);
        let changed = self.config.participants.len() != before;
        if changed {
            self.updated_at = now;
        }
        changed
    }

    /// Update the display name
    pub fn rename(&mut self, name: impl Into<String>, now: DateTime<Utc>) {
        self.channel_name = Some(name.into());
        self.updated_at = now;
    }

    /// Stop scheduled runs until resumed
    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.status = ChannelStatus::Paused;
        self.updated_at = now;
    }

    /// Resume after a pause or manual disable
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.status = ChannelStatus::Active;
        self.is_active = true;
        self.disabled_at = None;
        self.disabled_reason = None;
        self.auto_disabled = false;
        self.updated_at = now;
    }

    /// Disable because the platform no longer lets the bot post here
    pub fn auto_disable(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        self.status = ChannelStatus::Disabled;
        self.is_active = false;
        self.disabled_at = Some(now);
        self.disabled_reason = Some(reason.into());
        self.auto_disabled = true;
        self.updated_at = now;
    }

    /// Channel label used in messages and logs
    pub fn display_name(&self) -> &str {
        self.channel_name.as_deref().unwrap_or(&self.channel_id)
    }
}
