//! Test doubles for the chat platform, the summarizer, and the clock

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use standup_core::{
    Analysis, ChannelInfo, ChatPlatform, Clock, Mood, OutgoingMessage, PlatformError, PlatformResult,
    PostedMessage, Response, Summarizer, SummarizerError, UserProfile,
};

// ============================================================================
// Chat platform
// ============================================================================

/// A direct message captured by [`MockPlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDm {
    pub user_id: String,
    pub text: String,
}

/// A reaction captured by [`MockPlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedReaction {
    pub channel_id: String,
    pub ts: String,
    pub emoji: String,
}

/// Scriptable in-memory chat platform
///
/// Unknown users resolve to a plain available profile. Posted messages get
/// increasing timestamps so thread lookups stay unique.
#[derive(Debug, Default)]
pub struct MockPlatform {
    members: Mutex<HashMap<String, Vec<String>>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    posts: Mutex<Vec<OutgoingMessage>>,
    dms: Mutex<Vec<SentDm>>,
    reactions: Mutex<Vec<AddedReaction>>,
    post_failure: Mutex<Option<PlatformError>>,
    members_failure: Mutex<Option<PlatformError>>,
    failing_dms: Mutex<HashSet<String>>,
    failing_profiles: Mutex<HashSet<String>>,
    hidden_channels: Mutex<HashSet<String>>,
    seq: AtomicU64,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_members(&self, channel_id: &str, members: &[&str]) {
        self.members
            .lock()
            .insert(channel_id.to_string(), members.iter().map(ToString::to_string).collect());
    }

    pub fn set_profile(&self, profile: UserProfile) {
        self.profiles.lock().insert(profile.id.clone(), profile);
    }

    /// Mark a user away with a status text and emoji
    pub fn set_away(&self, user_id: &str, status_text: &str, status_emoji: &str) {
        self.set_profile(UserProfile {
            id: user_id.to_string(),
            status_text: status_text.to_string(),
            status_emoji: status_emoji.to_string(),
            ..UserProfile::default()
        });
    }

    pub fn set_bot(&self, user_id: &str) {
        self.set_profile(UserProfile {
            id: user_id.to_string(),
            is_bot: true,
            ..UserProfile::default()
        });
    }

    /// Make every `post_message` fail until cleared
    pub fn fail_posts(&self, error: Option<PlatformError>) {
        *self.post_failure.lock() = error;
    }

    pub fn fail_members(&self, error: Option<PlatformError>) {
        *self.members_failure.lock() = error;
    }

    pub fn fail_dm_to(&self, user_id: &str) {
        self.failing_dms.lock().insert(user_id.to_string());
    }

    /// Make profile lookups for one user fail
    pub fn fail_profile_of(&self, user_id: &str) {
        self.failing_profiles.lock().insert(user_id.to_string());
    }

    /// Make `get_channel_info` report the channel as invisible to the bot
    pub fn hide_channel(&self, channel_id: &str) {
        self.hidden_channels.lock().insert(channel_id.to_string());
    }

    pub fn posts(&self) -> Vec<OutgoingMessage> {
        self.posts.lock().clone()
    }

    /// Messages posted into a given thread
    pub fn thread_posts(&self, thread_ts: &str) -> Vec<OutgoingMessage> {
        self.posts
            .lock()
            .iter()
            .filter(|m| m.thread_ts.as_deref() == Some(thread_ts))
            .cloned()
            .collect()
    }

    pub fn dms(&self) -> Vec<SentDm> {
        self.dms.lock().clone()
    }

    pub fn reactions(&self) -> Vec<AddedReaction> {
        self.reactions.lock().clone()
    }

    fn next_ts(&self) -> String {
        let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        format!("1700000000.{n:06}")
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn post_message(&self, message: OutgoingMessage) -> PlatformResult<PostedMessage> {
        if let Some(err) = self.post_failure.lock().clone() {
            return Err(err);
        }
        let posted = PostedMessage {
            channel: message.channel.clone(),
            ts: self.next_ts(),
        };
        self.posts.lock().push(message);
        Ok(posted)
    }

    async fn update_message(&self, _channel_id: &str, _ts: &str, _text: &str) -> PlatformResult<()> {
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, text: &str) -> PlatformResult<PostedMessage> {
        if self.failing_dms.lock().contains(user_id) {
            return Err(PlatformError::Api("cannot_dm_bot".to_string()));
        }
        self.dms.lock().push(SentDm {
            user_id: user_id.to_string(),
            text: text.to_string(),
        });
        Ok(PostedMessage {
            channel: format!("D{user_id}"),
            ts: self.next_ts(),
        })
    }

    async fn get_permalink(&self, channel_id: &str, ts: &str) -> PlatformResult<Option<String>> {
        Ok(Some(format!(
            "https://example.slack.com/archives/{channel_id}/p{}",
            ts.replace('.', "")
        )))
    }

    async fn get_channel_info(&self, channel_id: &str) -> PlatformResult<Option<ChannelInfo>> {
        if self.hidden_channels.lock().contains(channel_id) {
            return Ok(None);
        }
        Ok(Some(ChannelInfo {
            id: channel_id.to_string(),
            name: Some(format!("channel-{}", channel_id.to_lowercase())),
            is_archived: false,
            is_member: true,
        }))
    }

    async fn get_channel_members(&self, channel_id: &str) -> PlatformResult<Vec<String>> {
        if let Some(err) = self.members_failure.lock().clone() {
            return Err(err);
        }
        Ok(self.members.lock().get(channel_id).cloned().unwrap_or_default())
    }

    async fn get_user_info(&self, user_id: &str) -> PlatformResult<UserProfile> {
        if self.failing_profiles.lock().contains(user_id) {
            return Err(PlatformError::Transport("connection reset".to_string()));
        }
        Ok(self.profiles.lock().get(user_id).cloned().unwrap_or_else(|| UserProfile {
            id: user_id.to_string(),
            name: Some(user_id.to_lowercase()),
            ..UserProfile::default()
        }))
    }

    async fn add_reaction(&self, channel_id: &str, ts: &str, emoji: &str) -> PlatformResult<()> {
        self.reactions.lock().push(AddedReaction {
            channel_id: channel_id.to_string(),
            ts: ts.to_string(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// Summarizer
// ============================================================================

#[derive(Debug, Clone)]
enum SummarizerBehavior {
    Succeed(Analysis),
    Fail,
    Hang(Duration),
}

/// Summarizer returning a canned analysis, an error, or nothing in time
#[derive(Debug)]
pub struct MockSummarizer {
    behavior: SummarizerBehavior,
    calls: AtomicU64,
}

impl MockSummarizer {
    pub fn succeeding(summary: &str) -> Self {
        Self::with(SummarizerBehavior::Succeed(Analysis {
            summary: summary.to_string(),
            achievements: vec!["Shipped the importer".to_string()],
            blockers: Vec::new(),
            next_steps: vec!["Start the exporter".to_string()],
            mood: Mood::Positive,
        }))
    }

    pub fn failing() -> Self {
        Self::with(SummarizerBehavior::Fail)
    }

    pub fn hanging(delay: Duration) -> Self {
        Self::with(SummarizerBehavior::Hang(delay))
    }

    fn with(behavior: SummarizerBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _questions: &[String], _responses: &[Response]) -> Result<Analysis, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            SummarizerBehavior::Succeed(analysis) => Ok(analysis.clone()),
            SummarizerBehavior::Fail => Err(SummarizerError::Request("upstream returned 500".to_string())),
            SummarizerBehavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Err(SummarizerError::Timeout(delay.as_secs()))
            }
        }
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
