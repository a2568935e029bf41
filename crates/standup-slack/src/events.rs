//! Inbound Slack payloads: Events API envelopes and slash commands

use serde::Deserialize;

/// Top-level Events API request body
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Endpoint ownership check sent when the request URL is configured
    UrlVerification { challenge: String },
    EventCallback(EventCallback),
    #[serde(other)]
    Unknown,
}

/// A workspace event delivery
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventCallback {
    pub team_id: String,
    #[serde(default)]
    pub event_id: Option<String>,
    pub event: SlackEvent,
    /// Installations the event was delivered for
    #[serde(default)]
    pub authorizations: Vec<Authorization>,
}

impl EventCallback {
    /// The app's bot user in the event's workspace
    pub fn bot_user_id(&self) -> Option<&str> {
        self.authorizations
            .iter()
            .find(|a| a.is_bot)
            .map(|a| a.user_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Authorization {
    pub user_id: String,
    #[serde(default)]
    pub is_bot: bool,
}

/// Events the app subscribes to
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    Message(MessageEvent),
    MemberLeftChannel { user: String, channel: String },
    ChannelRename { channel: RenamedChannel },
    ChannelDeleted { channel: String },
    ChannelArchive { channel: String },
    #[serde(other)]
    Other,
}

/// A channel message or thread reply
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MessageEvent {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    /// Set for edits, joins, bot posts, and other non-plain messages
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    /// Reply inside a thread, as opposed to the thread's parent
    pub fn is_thread_reply(&self) -> bool {
        self.thread_ts.as_deref().is_some_and(|parent| parent != self.ts)
    }

    /// Posted by a bot integration or carrying a subtype
    pub fn is_system_or_bot(&self) -> bool {
        self.subtype.is_some() || self.bot_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenamedChannel {
    pub id: String,
    pub name: String,
}

/// Form-encoded slash command invocation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlashCommand {
    pub team_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: Option<String>,
    pub user_id: String,
    pub command: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub response_url: Option<String>,
}

impl SlashCommand {
    /// Command name without the leading slash
    pub fn name(&self) -> &str {
        self.command.trim().trim_start_matches('/')
    }
}
