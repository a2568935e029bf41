//! Team entity - a workspace installation of the bot

use chrono::{DateTime, Utc};

/// Team entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub team_id: String,
    pub team_name: Option<String>,
    /// The bot's own user id in this workspace; its messages are never ingested
    pub bot_user_id: Option<String>,
    pub is_active: bool,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn new(team_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            team_id: team_id.into(),
            team_name: None,
            bot_user_id: None,
            is_active: true,
            installed_at: now,
            updated_at: now,
        }
    }

    pub fn with_bot_user(mut self, bot_user_id: impl Into<String>) -> Self {
        self.bot_user_id = Some(bot_user_id.into());
        self
    }

    /// Check whether a user id is this team's bot
    pub fn is_bot_user(&self, user_id: &str) -> bool {
        self.bot_user_id.as_deref() == Some(user_id)
    }
}
