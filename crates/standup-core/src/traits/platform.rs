//! Chat platform port - the operations the engines need from the workspace
//!
//! Implementations must report "the bot can no longer reach this channel"
//! as [`PlatformError::BotRemoved`], separate from other failures, because
//! it drives channel auto-disable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;

/// Platform error codes that mean the bot lost access to a channel
pub const BOT_REMOVED_CODES: [&str; 4] = [
    "channel_not_found",
    "not_in_channel",
    "channel_is_archived",
    "is_archived",
];

/// Errors from the chat platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("Bot cannot access channel: {code}")]
    BotRemoved { code: String },

    #[error("Platform API error: {0}")]
    Api(String),

    #[error("Rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl PlatformError {
    /// Classify a platform error code
    pub fn from_code(code: impl Into<String>) -> Self {
        let code = code.into();
        if BOT_REMOVED_CODES.contains(&code.as_str()) {
            Self::BotRemoved { code }
        } else {
            Self::Api(code)
        }
    }

    pub fn is_bot_removed(&self) -> bool {
        matches!(self, Self::BotRemoved { .. })
    }
}

impl From<PlatformError> for DomainError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::BotRemoved { code } => DomainError::BotRemoved(code),
            other => DomainError::PlatformError(other.to_string()),
        }
    }
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// A message to post into a channel or thread
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl OutgoingMessage {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks: None,
            thread_ts: None,
        }
    }

    /// Reply inside a thread
    pub fn in_thread(mut self, thread_ts: impl Into<String>) -> Self {
        self.thread_ts = Some(thread_ts.into());
        self
    }

    /// Attach rich layout blocks; `text` stays as the notification fallback
    pub fn with_blocks(mut self, blocks: serde_json::Value) -> Self {
        self.blocks = Some(blocks);
        self
    }
}

/// Identifiers of a posted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// Channel metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub name: Option<String>,
    pub is_archived: bool,
    pub is_member: bool,
}

/// User profile and presence status
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub real_name: Option<String>,
    pub deleted: bool,
    pub is_bot: bool,
    pub status_text: String,
    pub status_emoji: String,
    /// Unix seconds; 0 means the status never expires
    pub status_expiration: i64,
}

impl UserProfile {
    /// Best human-readable name
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.real_name.as_deref().filter(|s| !s.is_empty()))
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Operations consumed from the chat platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post a message to a channel or thread
    async fn post_message(&self, message: OutgoingMessage) -> PlatformResult<PostedMessage>;

    /// Replace the text of an existing message
    async fn update_message(&self, channel_id: &str, ts: &str, text: &str) -> PlatformResult<()>;

    /// Open a direct conversation with a user and post into it
    async fn send_direct_message(&self, user_id: &str, text: &str) -> PlatformResult<PostedMessage>;

    /// Get a permalink to a message; `None` when unavailable
    async fn get_permalink(&self, channel_id: &str, ts: &str) -> PlatformResult<Option<String>>;

    /// Get channel metadata; `None` when the bot cannot see the channel
    async fn get_channel_info(&self, channel_id: &str) -> PlatformResult<Option<ChannelInfo>>;

    /// List member user ids of a channel
    async fn get_channel_members(&self, channel_id: &str) -> PlatformResult<Vec<String>>;

    /// Get a user's profile and status
    async fn get_user_info(&self, user_id: &str) -> PlatformResult<UserProfile>;

    /// Add an emoji reaction to a message
    async fn add_reaction(&self, channel_id: &str, ts: &str, emoji: &str) -> PlatformResult<()>;
}
