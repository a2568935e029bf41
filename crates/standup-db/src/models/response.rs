//! Response database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for responses table
#[derive(Debug, Clone, FromRow)]
pub struct ResponseModel {
    pub id: Uuid,
    pub standup_id: Uuid,
    pub team_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub user_display_name: Option<String>,
    pub answers: Vec<String>,
    pub raw_message: String,
    pub message_ts: String,
    pub thread_ts: String,
    pub is_complete: bool,
    pub is_edited: bool,
    pub edit_count: i32,
    pub submitted_at: DateTime<Utc>,
    pub last_edited_at: Option<DateTime<Utc>>,
    pub response_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
