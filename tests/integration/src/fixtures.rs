//! Test fixtures
//!
//! [`Harness`] wires the engines to in-memory repositories, the mock
//! platform, and a manual clock starting on a Monday at 09:00 UTC.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use standup_core::{Channel, Standup, StandupId, Summarizer};
use standup_service::{
    ChannelConfigInput, ChannelService, IncomingReply, IngestOutcome, IngestionService, LifecycleService,
    Scheduler, SchedulerSettings, ServiceContext, ServiceContextBuilder, ServiceResult, StandupSettings,
};

use crate::memory::{
    InMemoryChannelRepository, InMemoryResponseRepository, InMemoryStandupRepository, InMemoryTeamRepository,
};
use crate::mocks::{ManualClock, MockPlatform};

pub const TEAM_ID: &str = "T0001";
pub const CHANNEL_ID: &str = "C0001";
pub const ADMIN_ID: &str = "UADMIN";
pub const BOT_USER_ID: &str = "UBOT";

/// Monday 2024-03-04 09:00:00 UTC
pub fn monday_nine() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Engines plus every collaborator, each reachable for assertions
pub struct Harness {
    pub channels: Arc<InMemoryChannelRepository>,
    pub standups: Arc<InMemoryStandupRepository>,
    pub responses: Arc<InMemoryResponseRepository>,
    pub teams: Arc<InMemoryTeamRepository>,
    pub platform: Arc<MockPlatform>,
    pub clock: Arc<ManualClock>,
    pub ctx: Arc<ServiceContext>,
    reply_seq: AtomicU64,
}

impl Harness {
    /// Harness with the disabled summarizer and default settings
    pub fn new() -> Self {
        Self::build(None, StandupSettings::default())
    }

    pub fn with_summarizer(summarizer: Arc<dyn Summarizer>) -> Self {
        Self::build(Some(summarizer), StandupSettings::default())
    }

    pub fn with_settings(settings: StandupSettings) -> Self {
        Self::build(None, settings)
    }

    pub fn build(summarizer: Option<Arc<dyn Summarizer>>, settings: StandupSettings) -> Self {
        let channels = Arc::new(InMemoryChannelRepository::new());
        let standups = Arc::new(InMemoryStandupRepository::new());
        let responses = Arc::new(InMemoryResponseRepository::new());
        let teams = Arc::new(InMemoryTeamRepository::new());
        let platform = Arc::new(MockPlatform::new());
        let clock = Arc::new(ManualClock::new(monday_nine()));

        let mut builder = ServiceContextBuilder::new()
            .channel_repo(channels.clone())
            .standup_repo(standups.clone())
            .response_repo(responses.clone())
            .team_repo(teams.clone())
            .platform(platform.clone())
            .clock(clock.clone())
            .settings(settings);
        if let Some(summarizer) = summarizer {
            builder = builder.summarizer(summarizer);
        }
        let ctx = builder.build().expect("all dependencies provided");

        Self {
            channels,
            standups,
            responses,
            teams,
            platform,
            clock,
            ctx: Arc::new(ctx),
            reply_seq: AtomicU64::new(0),
        }
    }

    pub fn ctx(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(Arc::clone(&self.ctx), SchedulerSettings::default())
    }

    /// Configure the test channel from slash-command style arguments
    pub async fn configure(&self, args: &str) -> Channel {
        let input = ChannelConfigInput::parse_args(args).expect("valid setup arguments");
        ChannelService::new(self.ctx())
            .configure_channel(TEAM_ID, CHANNEL_ID, ADMIN_ID, input, Some("eng".to_string()))
            .await
            .expect("channel configured")
    }

    /// Configure the test channel with explicit participants
    pub async fn configure_with(&self, participants: &[&str]) -> Channel {
        self.configure(&format!("participants={}", participants.join(",")))
            .await
    }

    /// Start a manual standup in the test channel
    pub async fn start(&self) -> ServiceResult<Standup> {
        LifecycleService::new(self.ctx())
            .create_standup(TEAM_ID, CHANNEL_ID, ADMIN_ID, true)
            .await
    }

    /// Deliver a thread reply to a standup's prompt
    pub async fn reply(&self, standup: &Standup, user_id: &str, text: &str) -> ServiceResult<IngestOutcome> {
        let reply = IncomingReply {
            team_id: TEAM_ID.to_string(),
            channel_id: standup.channel_id.clone(),
            user_id: Some(user_id.to_string()),
            text: text.to_string(),
            ts: self.next_reply_ts(),
            thread_ts: standup.thread_ts.clone(),
            ..IncomingReply::default()
        };
        self.ingest(&reply).await
    }

    pub async fn ingest(&self, reply: &IncomingReply) -> ServiceResult<IngestOutcome> {
        IngestionService::new(self.ctx()).ingest(reply).await
    }

    pub fn next_reply_ts(&self) -> String {
        let n = self.reply_seq.fetch_add(1, Ordering::SeqCst) + 1;
        format!("1700009999.{n:06}")
    }

    /// Stored copy of a standup
    pub fn standup(&self, id: StandupId) -> Standup {
        self.standups.get(id).expect("standup exists")
    }

    pub fn channel(&self) -> Channel {
        self.channels.get(TEAM_ID, CHANNEL_ID).expect("channel exists")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
