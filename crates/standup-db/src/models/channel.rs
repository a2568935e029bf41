//! Channel configuration database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for channels table
#[derive(Debug, Clone, FromRow)]
pub struct ChannelModel {
    pub team_id: String,
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub configured_by: String,
    pub questions: Vec<String>,
    /// "HH:MM" in the channel timezone
    pub schedule_time: String,
    /// 0 = Sunday .. 6 = Saturday
    pub schedule_days: Vec<i16>,
    pub timezone: String,
    pub participants: Vec<String>,
    pub response_timeout_minutes: i32,
    pub reminder_interval_minutes: i32,
    pub enable_reminders: bool,
    pub status: String,
    pub is_active: bool,
    pub total_standups: i32,
    pub last_standup_at: Option<DateTime<Utc>>,
    pub avg_response_rate: f64,
    pub avg_response_time_ms: Option<i64>,
    pub disabled_at: Option<DateTime<Utc>>,
    pub disabled_reason: Option<String>,
    pub auto_disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChannelModel {
    /// Check if the channel was disabled by the bot itself
    #[inline]
    pub fn is_auto_disabled(&self) -> bool {
        self.auto_disabled && !self.is_active
    }
}
