//! Standup database model

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use standup_core::{AwaySnapshot, ReminderRecord, StandupStats, StandupSummary};

/// Database model for standups table
///
/// Nested aggregates (stats, reminder log, away snapshot, summary) are
/// stored as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct StandupModel {
    pub id: Uuid,
    pub team_id: String,
    pub channel_id: String,
    pub status: String,
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
    pub stats: Json<StandupStats>,
    pub reminders: Json<Vec<ReminderRecord>>,
    pub next_reminder_at: Option<DateTime<Utc>>,
    pub away: Json<AwaySnapshot>,
    pub summary: Option<Json<StandupSummary>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Id-only projection used by retention cleanup
#[derive(Debug, Clone, FromRow)]
pub struct IdRow {
    pub id: Uuid,
}
