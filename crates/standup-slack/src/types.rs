//! Web API response bodies
//!
//! Every Web API answer carries `ok` and, when false, an `error` code; the
//! method-specific fields below are decoded only after `ok` is checked.

use serde::Deserialize;
use standup_core::{ChannelInfo, UserProfile};

#[derive(Debug, Deserialize)]
pub(crate) struct PostMessageResponse {
    pub channel: String,
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PermalinkResponse {
    pub permalink: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenConversationResponse {
    pub channel: ConversationRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationInfoResponse {
    pub channel: Conversation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Conversation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_member: bool,
}

impl From<Conversation> for ChannelInfo {
    fn from(c: Conversation) -> Self {
        ChannelInfo {
            id: c.id,
            name: c.name,
            is_archived: c.is_archived,
            is_member: c.is_member,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MembersResponse {
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl MembersResponse {
    /// Cursor for the next page; Slack sends an empty string on the last page
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .and_then(|m| m.next_cursor.as_deref())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoResponse {
    pub user: SlackUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub profile: SlackProfile,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SlackProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub status_emoji: Option<String>,
    #[serde(default)]
    pub status_expiration: Option<i64>,
}

impl From<SlackUser> for UserProfile {
    fn from(user: SlackUser) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            display_name: user.profile.display_name,
            real_name: user.profile.real_name.or(user.real_name),
            deleted: user.deleted,
            is_bot: user.is_bot,
            status_text: user.profile.status_text.unwrap_or_default(),
            status_emoji: user.profile.status_emoji.unwrap_or_default(),
            status_expiration: user.profile.status_expiration.unwrap_or(0),
        }
    }
}
