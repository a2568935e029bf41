//! Standup lifecycle service
//!
//! Creates standups (participant resolution, availability filtering,
//! prompt posting) and cancels them. Completion lives in
//! [`CompletionService`](super::completion::CompletionService).

use std::collections::HashSet;

use futures::future::join_all;
use standup_core::{
    Channel, ChannelStatus, DomainError, OutgoingMessage, Standup, StandupId, StandupStatus, UserProfile,
};
use tracing::{debug, info, instrument, warn};

use super::availability::AvailabilityService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::messages::{away_notification, cancellation_notice, standup_prompt};

/// Platform user that is never a participant
const SLACKBOT_USER_ID: &str = "USLACKBOT";

/// Disable a channel the bot can no longer reach
///
/// Returns whether a channel was found and disabled. Failures are logged,
/// never propagated; callers are already on an error path.
pub(crate) async fn auto_disable_channel(
    ctx: &ServiceContext,
    team_id: &str,
    channel_id: &str,
    reason: &str,
) -> bool {
    let mut channel = match ctx.channel_repo().find(team_id, channel_id).await {
        Ok(Some(channel)) => channel,
        Ok(None) => return false,
        Err(e) => {
            warn!(channel_id = %channel_id, error = %e, "Failed to load channel for auto-disable");
            return false;
        }
    };
    if channel.auto_disabled {
        return true;
    }

    channel.auto_disable(reason, ctx.now());
    match ctx.channel_repo().update(&channel).await {
        Ok(()) => {
            warn!(team_id = %team_id, channel_id = %channel_id, reason = %reason, "Channel auto-disabled");
            true
        }
        Err(e) => {
            warn!(channel_id = %channel_id, error = %e, "Failed to persist auto-disable");
            false
        }
    }
}

/// Standup lifecycle service
pub struct LifecycleService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LifecycleService<'a> {
    /// Create a new LifecycleService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start a standup in a configured channel
    ///
    /// Fails with a precondition error when the channel is missing,
    /// inactive, already running a standup, has no eligible participants,
    /// or when enough of the team is away that the run is skipped.
    #[instrument(skip(self))]
    pub async fn create_standup(
        &self,
        team_id: &str,
        channel_id: &str,
        actor: &str,
        is_manual: bool,
    ) -> ServiceResult<Standup> {
        let mut channel = self
            .ctx
            .channel_repo()
            .find(team_id, channel_id)
            .await?
            .ok_or(DomainError::ChannelNotConfigured)?;

        if !channel.is_runnable() {
            let status = if channel.is_active {
                channel.status
            } else {
                ChannelStatus::Disabled
            };
            return Err(DomainError::ChannelInactive(status).into());
        }

        if !self
            .ctx
            .standup_repo()
            .find_active(team_id, channel_id)
            .await?
            .is_empty()
        {
            return Err(DomainError::StandupAlreadyActive.into());
        }

        let candidates = self.resolve_candidates(&channel).await?;

        let report = AvailabilityService::new(self.ctx)
            .filter_available(&candidates)
            .await;
        if report.should_skip || report.available.is_empty() {
            info!(
                channel_id = %channel_id,
                away = report.away_count(),
                total = report.total,
                "Skipping standup, team is away"
            );
            let notice = away_notification(&report.away, report.total, &channel, self.ctx.now());
            if let Err(e) = self
                .ctx
                .platform()
                .post_message(OutgoingMessage::new(channel_id, notice))
                .await
            {
                warn!(channel_id = %channel_id, error = %e, "Failed to post away notification");
            }
            return Err(DomainError::StandupSkippedAllAway {
                away: report.away_count(),
                total: report.total,
            }
            .into());
        }

        let now = self.ctx.now();
        let mut standup = Standup::new(
            team_id,
            channel_id,
            channel.config.questions.clone(),
            report.available.clone(),
            actor,
            is_manual,
            now,
            channel.config.response_timeout,
        )
        .with_away(report.snapshot());

        self.ctx.standup_repo().create(&standup).await?;

        let prompt = standup_prompt(&standup, &channel);
        let posted = match self
            .ctx
            .platform()
            .post_message(OutgoingMessage::new(channel_id, prompt))
            .await
        {
            Ok(posted) => posted,
            Err(e) => {
                warn!(standup_id = %standup.id, error = %e, "Failed to post standup prompt, rolling back");
                if let Err(delete_err) = self.ctx.standup_repo().delete(standup.id).await {
                    warn!(standup_id = %standup.id, error = %delete_err, "Rollback delete failed");
                }
                if e.is_bot_removed() {
                    auto_disable_channel(self.ctx, team_id, channel_id, "bot_removed").await;
                }
                return Err(e.into());
            }
        };

        standup.mark_posted(posted.ts, now);
        if channel.config.enable_reminders {
            let first = now + channel.config.reminder_interval;
            if first < standup.response_deadline {
                standup.next_reminder_at = Some(first);
            }
        }
        self.ctx.standup_repo().save(&standup).await?;

        channel.increment_standup_count(now);
        if let Err(e) = self.ctx.channel_repo().update(&channel).await {
            warn!(channel_id = %channel_id, error = %e, "Failed to update channel stats");
        }

        info!(
            standup_id = %standup.id,
            channel_id = %channel_id,
            participants = standup.expected_participants.len(),
            away = standup.away.away_count(),
            manual = is_manual,
            "Standup started"
        );

        Ok(standup)
    }

    /// Explicit participants, or channel members minus bots and the app itself
    ///
    /// Explicit lists are taken as-is so deactivated participants surface as
    /// away rather than vanishing.
    async fn resolve_candidates(&self, channel: &Channel) -> ServiceResult<Vec<String>> {
        let mut candidates = if channel.has_explicit_participants() {
            channel.config.participants.clone()
        } else {
            self.eligible_members(channel).await?
        };

        let mut seen = HashSet::new();
        candidates.retain(|id| seen.insert(id.clone()));

        if candidates.is_empty() {
            return Err(DomainError::NoParticipants.into());
        }
        Ok(candidates)
    }

    async fn eligible_members(&self, channel: &Channel) -> ServiceResult<Vec<String>> {
        let members: Vec<String> = match self
            .ctx
            .platform()
            .get_channel_members(&channel.channel_id)
            .await
        {
            Ok(members) => members.into_iter().filter(|m| !m.starts_with('B')).collect(),
            Err(e) => {
                if e.is_bot_removed() {
                    auto_disable_channel(self.ctx, &channel.team_id, &channel.channel_id, "bot_removed").await;
                }
                return Err(e.into());
            }
        };

        let bot_user = match self.ctx.team_repo().find(&channel.team_id).await {
            Ok(team) => team.and_then(|t| t.bot_user_id),
            Err(e) => {
                warn!(team_id = %channel.team_id, error = %e, "Failed to load team");
                None
            }
        };

        let batch_size = self.ctx.settings().availability.batch_size.max(1);
        let mut eligible = Vec::with_capacity(members.len());
        for batch in members.chunks(batch_size) {
            let profiles = join_all(batch.iter().map(|id| self.ctx.platform().get_user_info(id))).await;
            for (id, profile) in batch.iter().zip(profiles) {
                match profile {
                    Ok(profile) if !is_eligible(id, &profile, bot_user.as_deref()) => {
                        debug!(user_id = %id, "Dropping ineligible member");
                    }
                    Ok(_) => eligible.push(id.clone()),
                    Err(e) => {
                        warn!(user_id = %id, error = %e, "Profile lookup failed, keeping member");
                        if bot_user.as_deref() != Some(id.as_str()) && id != SLACKBOT_USER_ID {
                            eligible.push(id.clone());
                        }
                    }
                }
            }
        }
        Ok(eligible)
    }

    /// Cancel an open standup; returns false when there is nothing to cancel
    #[instrument(skip(self))]
    pub async fn cancel_standup(&self, standup_id: StandupId, actor: &str, reason: &str) -> ServiceResult<bool> {
        let Some(mut standup) = self.ctx.standup_repo().find_by_id(standup_id).await? else {
            return Ok(false);
        };
        if !standup.is_open() {
            debug!(status = %standup.status, "Standup is not open, nothing to cancel");
            return Ok(false);
        }

        let now = self.ctx.now();
        if !self
            .ctx
            .standup_repo()
            .transition(standup_id, &StandupStatus::OPEN, StandupStatus::Cancelled, now)
            .await?
        {
            debug!("Standup closed concurrently, nothing to cancel");
            return Ok(false);
        }
        standup.cancel(actor, reason, now);
        self.ctx.standup_repo().save(&standup).await?;

        if let Some(thread_ts) = standup.thread_ts.as_deref() {
            let notice = OutgoingMessage::new(&standup.channel_id, cancellation_notice(actor, reason))
                .in_thread(thread_ts);
            if let Err(e) = self.ctx.platform().post_message(notice).await {
                warn!(standup_id = %standup_id, error = %e, "Failed to post cancellation notice");
            }
        }

        info!(standup_id = %standup_id, actor = %actor, "Standup cancelled");
        Ok(true)
    }

    /// Active standup for a channel, if any
    pub async fn active_standup(&self, team_id: &str, channel_id: &str) -> ServiceResult<Option<Standup>> {
        Ok(self
            .ctx
            .standup_repo()
            .find_active(team_id, channel_id)
            .await?
            .into_iter()
            .next())
    }

    /// Active standup or a not-found error
    pub async fn require_active(&self, team_id: &str, channel_id: &str) -> ServiceResult<Standup> {
        self.active_standup(team_id, channel_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Active standup", channel_id.to_string()))
    }
}

fn is_eligible(id: &str, profile: &UserProfile, bot_user: Option<&str>) -> bool {
    !profile.deleted && !profile.is_bot && id != SLACKBOT_USER_ID && bot_user != Some(id)
}
