//! Team (workspace installation) database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for teams table
#[derive(Debug, Clone, FromRow)]
pub struct TeamModel {
    pub team_id: String,
    pub team_name: Option<String>,
    pub bot_user_id: Option<String>,
    pub is_active: bool,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
