//! Service context - dependency container for services
//!
//! Holds the repositories, the chat platform, the summarizer, and the clock
//! every engine needs. Engines borrow the context; nothing in it caches
//! standup or channel state between calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use standup_common::{AppConfig, AvailabilityConfig};
use standup_core::traits::{
    ChannelRepository, ChatPlatform, Clock, ResponseRepository, StandupRepository, Summarizer,
    SystemClock, TeamRepository,
};

use crate::summarizer::DisabledSummarizer;

use super::error::{ServiceError, ServiceResult};

/// Engine tuning that does not belong to a single channel
#[derive(Debug, Clone)]
pub struct StandupSettings {
    /// Away detection thresholds and keyword lists
    pub availability: AvailabilityConfig,
    /// Upper bound on a single summarizer call
    pub summarizer_timeout: Duration,
    /// Age after which terminal standups are deleted
    pub retention_days: i64,
}

impl Default for StandupSettings {
    fn default() -> Self {
        Self {
            availability: AvailabilityConfig::default(),
            summarizer_timeout: Duration::from_secs(30),
            retention_days: 30,
        }
    }
}

impl From<&AppConfig> for StandupSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            availability: config.availability.clone(),
            summarizer_timeout: Duration::from_secs(config.summarizer.timeout_secs),
            retention_days: config.scheduler.retention_days,
        }
    }
}

/// Service context containing all dependencies
///
/// This is the dependency container that gets passed to all services.
/// It provides access to:
/// - Channel, standup, response and team repositories
/// - The chat platform client
/// - The summarizer
/// - The clock
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    channel_repo: Arc<dyn ChannelRepository>,
    standup_repo: Arc<dyn StandupRepository>,
    response_repo: Arc<dyn ResponseRepository>,
    team_repo: Arc<dyn TeamRepository>,

    // Collaborators
    platform: Arc<dyn ChatPlatform>,
    summarizer: Arc<dyn Summarizer>,
    clock: Arc<dyn Clock>,

    settings: StandupSettings,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        channel_repo: Arc<dyn ChannelRepository>,
        standup_repo: Arc<dyn StandupRepository>,
        response_repo: Arc<dyn ResponseRepository>,
        team_repo: Arc<dyn TeamRepository>,
        platform: Arc<dyn ChatPlatform>,
        summarizer: Arc<dyn Summarizer>,
        clock: Arc<dyn Clock>,
        settings: StandupSettings,
    ) -> Self {
        Self {
            channel_repo,
            standup_repo,
            response_repo,
            team_repo,
            platform,
            summarizer,
            clock,
            settings,
        }
    }

    // === Repositories ===

    /// Get the channel repository
    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    /// Get the standup repository
    pub fn standup_repo(&self) -> &dyn StandupRepository {
        self.standup_repo.as_ref()
    }

    /// Get the response repository
    pub fn response_repo(&self) -> &dyn ResponseRepository {
        self.response_repo.as_ref()
    }

    /// Get the team repository
    pub fn team_repo(&self) -> &dyn TeamRepository {
        self.team_repo.as_ref()
    }

    // === Collaborators ===

    /// Get the chat platform client
    pub fn platform(&self) -> &dyn ChatPlatform {
        self.platform.as_ref()
    }

    /// Get the summarizer
    pub fn summarizer(&self) -> &dyn Summarizer {
        self.summarizer.as_ref()
    }

    /// Current instant according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Get the engine settings
    pub fn settings(&self) -> &StandupSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("platform", &"dyn ChatPlatform")
            .field("summarizer", &"dyn Summarizer")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    standup_repo: Option<Arc<dyn StandupRepository>>,
    response_repo: Option<Arc<dyn ResponseRepository>>,
    team_repo: Option<Arc<dyn TeamRepository>>,
    platform: Option<Arc<dyn ChatPlatform>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    clock: Option<Arc<dyn Clock>>,
    settings: Option<StandupSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    pub fn standup_repo(mut self, repo: Arc<dyn StandupRepository>) -> Self {
        self.standup_repo = Some(repo);
        self
    }

    pub fn response_repo(mut self, repo: Arc<dyn ResponseRepository>) -> Self {
        self.response_repo = Some(repo);
        self
    }

    pub fn team_repo(mut self, repo: Arc<dyn TeamRepository>) -> Self {
        self.team_repo = Some(repo);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn ChatPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Defaults to [`DisabledSummarizer`]: every completion uses the fallback summary
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Defaults to [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn settings(mut self, settings: StandupSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.channel_repo.ok_or_else(|| ServiceError::validation("channel_repo is required"))?,
            self.standup_repo.ok_or_else(|| ServiceError::validation("standup_repo is required"))?,
            self.response_repo.ok_or_else(|| ServiceError::validation("response_repo is required"))?,
            self.team_repo.ok_or_else(|| ServiceError::validation("team_repo is required"))?,
            self.platform.ok_or_else(|| ServiceError::validation("platform is required"))?,
            self.summarizer.unwrap_or_else(|| Arc::new(DisabledSummarizer)),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.settings.unwrap_or_default(),
        ))
    }
}
