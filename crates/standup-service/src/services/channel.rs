//! Channel service
//!
//! Handles channel configuration, pause/resume, and membership events.

use standup_core::{Channel, ChannelConfig, ChannelStatus, DomainError};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::ChannelConfigInput;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::lifecycle::auto_disable_channel;

/// What a membership event did to the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// The bot itself left; the channel was disabled
    BotRemoved,
    ParticipantRemoved,
    Unchanged,
}

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    /// Create a new ChannelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get a configured channel
    pub async fn get_channel(&self, team_id: &str, channel_id: &str) -> ServiceResult<Channel> {
        self.ctx
            .channel_repo()
            .find(team_id, channel_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Channel", channel_id.to_string()))
    }

    /// Create or update a channel's standup configuration
    ///
    /// Unset input fields keep the current value, or the default for a new
    /// channel. A reconfigured channel is also re-enabled. Fails with
    /// `BotRemoved` when the bot cannot see the channel.
    #[instrument(skip(self, input))]
    pub async fn configure_channel(
        &self,
        team_id: &str,
        channel_id: &str,
        actor: &str,
        input: ChannelConfigInput,
        channel_name: Option<String>,
    ) -> ServiceResult<Channel> {
        input.validate()?;
        let channel_name = match self.ctx.platform().get_channel_info(channel_id).await {
            Ok(Some(info)) => channel_name.or(info.name),
            Ok(None) => return Err(DomainError::BotRemoved("channel_not_found".into()).into()),
            Err(e) if e.is_bot_removed() => return Err(e.into()),
            Err(e) => {
                warn!(channel_id = %channel_id, error = %e, "Channel lookup failed, configuring anyway");
                channel_name
            }
        };
        let now = self.ctx.now();

        let existing = self.ctx.channel_repo().find(team_id, channel_id).await?;
        let channel = match existing {
            Some(mut channel) => {
                let config = input.apply_to(channel.config.clone())?;
                channel.reconfigure(config, actor, now);
                if channel.status != ChannelStatus::Active || !channel.is_active {
                    channel.resume(now);
                }
                if let Some(name) = channel_name {
                    channel.rename(name, now);
                }
                self.ctx.channel_repo().update(&channel).await?;
                info!(channel_id = %channel_id, actor = %actor, "Channel reconfigured");
                channel
            }
            None => {
                let config = input.apply_to(ChannelConfig::default())?;
                let mut channel = Channel::new(team_id, channel_id, actor, config, now);
                if let Some(name) = channel_name {
                    channel = channel.with_name(name);
                }
                self.ctx.channel_repo().create(&channel).await?;
                info!(channel_id = %channel_id, actor = %actor, "Channel configured");
                channel
            }
        };

        Ok(channel)
    }

    /// Pause or resume scheduled standups
    #[instrument(skip(self))]
    pub async fn set_channel_status(
        &self,
        team_id: &str,
        channel_id: &str,
        status: ChannelStatus,
    ) -> ServiceResult<Channel> {
        let mut channel = self
            .ctx
            .channel_repo()
            .find(team_id, channel_id)
            .await?
            .ok_or(DomainError::ChannelNotConfigured)?;

        let now = self.ctx.now();
        match status {
            ChannelStatus::Active => channel.resume(now),
            ChannelStatus::Paused => channel.pause(now),
            ChannelStatus::Disabled => channel.auto_disable("disabled_by_admin", now),
        }
        self.ctx.channel_repo().update(&channel).await?;

        info!(channel_id = %channel_id, status = %status, "Channel status changed");
        Ok(channel)
    }

    /// A user left the channel
    #[instrument(skip(self))]
    pub async fn handle_member_left(
        &self,
        team_id: &str,
        channel_id: &str,
        user_id: &str,
    ) -> ServiceResult<MembershipChange> {
        let is_bot = self
            .ctx
            .team_repo()
            .find(team_id)
            .await?
            .is_some_and(|team| team.is_bot_user(user_id));
        if is_bot {
            auto_disable_channel(self.ctx, team_id, channel_id, "bot_removed").await;
            return Ok(MembershipChange::BotRemoved);
        }

        let Some(mut channel) = self.ctx.channel_repo().find(team_id, channel_id).await? else {
            return Ok(MembershipChange::Unchanged);
        };
        if !channel.remove_participant(user_id, self.ctx.now()) {
            return Ok(MembershipChange::Unchanged);
        }
        self.ctx.channel_repo().update(&channel).await?;

        info!(channel_id = %channel_id, user_id = %user_id, "Participant removed");
        Ok(MembershipChange::ParticipantRemoved)
    }

    /// Keep the stored channel name in sync
    #[instrument(skip(self))]
    pub async fn handle_channel_renamed(&self, team_id: &str, channel_id: &str, name: &str) -> ServiceResult<bool> {
        let Some(mut channel) = self.ctx.channel_repo().find(team_id, channel_id).await? else {
            return Ok(false);
        };
        channel.rename(name, self.ctx.now());
        self.ctx.channel_repo().update(&channel).await?;
        Ok(true)
    }

    /// The channel was deleted or archived
    #[instrument(skip(self))]
    pub async fn handle_channel_gone(&self, team_id: &str, channel_id: &str, reason: &str) -> bool {
        let disabled = auto_disable_channel(self.ctx, team_id, channel_id, reason).await;
        if !disabled {
            debug!(channel_id = %channel_id, reason = %reason, "No configured channel to disable");
        }
        disabled
    }
}
