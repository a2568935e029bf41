//! Completion service
//!
//! Decides when an open standup is done and finishes it: summarize, post
//! results, fold stats into the channel.

use chrono::{DateTime, Duration, Utc};
use standup_core::{
    DomainError, OutgoingMessage, Response, ResponseStats, Standup, StandupId, StandupStatus, StandupSummary,
};
use tracing::{debug, info, instrument, warn};

use crate::summarizer::{fallback_summary, summary_from_analysis};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::lifecycle::auto_disable_channel;
use super::messages::completion_message;

/// Extra time past the summarizer timeout before an analyzing standup
/// counts as stalled
const STALLED_ANALYSIS_GRACE_SECS: i64 = 5 * 60;

/// What asked for a completion check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A reply was just recorded
    Response,
    /// Periodic expiry sweep
    Sweep,
    /// An admin asked for it
    Manual,
}

/// Why a standup was completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    AllResponded,
    Expired,
    Manual,
}

impl CompletionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllResponded => "auto_all_responses",
            Self::Expired => "expired",
            Self::Manual => "manual_admin",
        }
    }
}

impl std::fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure decision for an open standup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionDecision {
    NotOpen(StandupStatus),
    Complete(CompletionReason),
    ScheduleReminder(DateTime<Utc>),
    Wait,
}

/// Decide what to do with a standup at `now`
///
/// A reminder is only scheduled when none is pending and it would fire
/// before the deadline.
pub fn decide(
    standup: &Standup,
    reminders_enabled: bool,
    reminder_interval: Duration,
    now: DateTime<Utc>,
) -> CompletionDecision {
    if !standup.is_open() {
        return CompletionDecision::NotOpen(standup.status);
    }
    if standup.has_all_responses() {
        return CompletionDecision::Complete(CompletionReason::AllResponded);
    }
    if standup.is_expired(now) {
        return CompletionDecision::Complete(CompletionReason::Expired);
    }
    if reminders_enabled && standup.next_reminder_at.is_none() {
        let at = now + reminder_interval;
        if at < standup.response_deadline {
            return CompletionDecision::ScheduleReminder(at);
        }
    }
    CompletionDecision::Wait
}

/// Result of a completion check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    NotOpen(StandupStatus),
    Waiting {
        missing: Vec<String>,
        time_remaining: Duration,
    },
    ReminderScheduled {
        next_reminder_at: DateTime<Utc>,
    },
    Completed(CompletionReason),
}

impl CheckOutcome {
    /// Short label for logs and command replies
    pub fn action(&self) -> &'static str {
        match self {
            Self::NotOpen(_) | Self::Waiting { .. } => "none",
            Self::ReminderScheduled { .. } => "reminder_scheduled",
            Self::Completed(_) => "completed",
        }
    }
}

/// Completion service
pub struct CompletionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CompletionService<'a> {
    /// Create a new CompletionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Re-evaluate a standup and complete or schedule a reminder as needed
    #[instrument(skip(self))]
    pub async fn check_completion(&self, standup_id: StandupId, trigger: Trigger) -> ServiceResult<CheckOutcome> {
        let mut standup = self
            .ctx
            .standup_repo()
            .find_by_id(standup_id)
            .await?
            .ok_or(DomainError::StandupNotFound(standup_id))?;

        let (enabled, interval) = match self
            .ctx
            .channel_repo()
            .find(&standup.team_id, &standup.channel_id)
            .await?
        {
            Some(channel) => (channel.config.enable_reminders, channel.config.reminder_interval),
            None => (false, Duration::zero()),
        };

        let now = self.ctx.now();
        match decide(&standup, enabled, interval, now) {
            CompletionDecision::NotOpen(status) => Ok(CheckOutcome::NotOpen(status)),
            CompletionDecision::Complete(reason) => match self.complete_standup(standup_id, reason).await {
                Ok(_) => Ok(CheckOutcome::Completed(reason)),
                Err(ServiceError::Domain(DomainError::StandupNotOpen(status))) => Ok(CheckOutcome::NotOpen(status)),
                Err(e) => Err(e),
            },
            CompletionDecision::ScheduleReminder(at) => {
                standup.next_reminder_at = Some(at);
                standup.updated_at = now;
                if !self.ctx.standup_repo().save(&standup).await? {
                    return Ok(CheckOutcome::NotOpen(self.current_status(standup_id).await?));
                }
                debug!(next_reminder_at = %at, "Reminder scheduled");
                Ok(CheckOutcome::ReminderScheduled { next_reminder_at: at })
            }
            CompletionDecision::Wait => Ok(CheckOutcome::Waiting {
                missing: standup.missing_participants(),
                time_remaining: standup.time_remaining(now),
            }),
        }
    }

    /// Finish a standup: summarize, post results, update stats
    ///
    /// The standup is claimed with a conditional move to analyzing, so
    /// concurrent triggers finish it once. An analyzing standup is only
    /// taken over after it has stalled; a run that fails after the claim
    /// leaves it analyzing for [`Self::recover_stalled`]. Posting failures
    /// do not stop completion.
    #[instrument(skip(self))]
    pub async fn complete_standup(&self, standup_id: StandupId, reason: CompletionReason) -> ServiceResult<Standup> {
        let mut standup = self
            .ctx
            .standup_repo()
            .find_by_id(standup_id)
            .await?
            .ok_or(DomainError::StandupNotFound(standup_id))?;

        let now = self.ctx.now();
        let claim_from: &[StandupStatus] = if standup.is_open() {
            &StandupStatus::OPEN
        } else if standup.status == StandupStatus::Analyzing && standup.updated_at < self.stalled_before(now) {
            &[StandupStatus::Analyzing]
        } else {
            return Err(DomainError::StandupNotOpen(standup.status).into());
        };

        let responses = self.ctx.response_repo().find_by_standup(standup_id).await?;

        if !self
            .ctx
            .standup_repo()
            .transition(standup_id, claim_from, StandupStatus::Analyzing, now)
            .await?
        {
            let status = self.current_status(standup_id).await?;
            debug!(status = %status, "Standup already claimed");
            return Err(DomainError::StandupNotOpen(status).into());
        }
        standup.begin_analysis(now);

        let summary = self.summarize(&standup, &responses).await;

        let stats = ResponseStats::from_responses(&responses);
        for response in &responses {
            if !standup.has_responded(&response.user_id) {
                standup.actual_participants.push(response.user_id.clone());
            }
        }
        standup.stats.total_responded = standup.actual_participants.len() as u32;
        standup.stats.avg_response_time_ms = stats.avg_response_time_ms;
        standup.stats.refresh_rate();

        let now = self.ctx.now();
        if let Some(thread_ts) = standup.thread_ts.clone() {
            let text = completion_message(&standup, &responses, &summary, now);
            let message = OutgoingMessage::new(&standup.channel_id, text).in_thread(thread_ts);
            match self.ctx.platform().post_message(message).await {
                Ok(posted) => standup.summary_message_ts = Some(posted.ts),
                Err(e) => {
                    warn!(standup_id = %standup_id, error = %e, "Failed to post completion message");
                    if e.is_bot_removed() {
                        auto_disable_channel(self.ctx, &standup.team_id, &standup.channel_id, "bot_removed").await;
                    }
                }
            }
        }

        standup.summary = Some(summary);
        standup.complete(now);
        if !self.ctx.standup_repo().save(&standup).await? {
            let status = self.current_status(standup_id).await?;
            warn!(standup_id = %standup_id, status = %status, "Standup closed while analyzing");
            return Err(DomainError::StandupNotOpen(status).into());
        }

        match self
            .ctx
            .channel_repo()
            .find(&standup.team_id, &standup.channel_id)
            .await
        {
            Ok(Some(mut channel)) => {
                channel.record_completion(standup.stats.response_rate, standup.stats.avg_response_time_ms, now);
                if let Err(e) = self.ctx.channel_repo().update(&channel).await {
                    warn!(channel_id = %channel.channel_id, error = %e, "Failed to update channel stats");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(channel_id = %standup.channel_id, error = %e, "Failed to load channel for stats"),
        }

        info!(
            standup_id = %standup_id,
            reason = %reason,
            responded = standup.stats.total_responded,
            expected = standup.stats.total_expected,
            "Standup completed"
        );
        Ok(standup)
    }

    /// Finish standups left analyzing by an interrupted completion
    ///
    /// Returns the number completed.
    #[instrument(skip(self))]
    pub async fn recover_stalled(&self) -> ServiceResult<usize> {
        let now = self.ctx.now();
        let stalled = self
            .ctx
            .standup_repo()
            .find_stalled_analysis(self.stalled_before(now))
            .await?;

        let mut completed = 0;
        for standup in stalled {
            let reason = if standup.has_all_responses() {
                CompletionReason::AllResponded
            } else if standup.is_expired(now) {
                CompletionReason::Expired
            } else {
                CompletionReason::Manual
            };
            warn!(standup_id = %standup.id, since = %standup.updated_at, "Recovering stalled completion");
            match self.complete_standup(standup.id, reason).await {
                Ok(_) => completed += 1,
                Err(e) => warn!(standup_id = %standup.id, error = %e, "Stalled completion recovery failed"),
            }
        }
        Ok(completed)
    }

    /// Analyzing standups last touched before this instant have stalled
    fn stalled_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let timeout = self.ctx.settings().summarizer_timeout.as_secs() as i64;
        now - Duration::seconds(timeout + STALLED_ANALYSIS_GRACE_SECS)
    }

    async fn current_status(&self, standup_id: StandupId) -> ServiceResult<StandupStatus> {
        Ok(self
            .ctx
            .standup_repo()
            .find_by_id(standup_id)
            .await?
            .ok_or(DomainError::StandupNotFound(standup_id))?
            .status)
    }

    /// AI summary within the configured timeout, or the fallback
    async fn summarize(&self, standup: &Standup, responses: &[Response]) -> StandupSummary {
        if responses.is_empty() {
            return fallback_summary(responses, standup.stats.total_expected, self.ctx.now());
        }

        let timeout = self.ctx.settings().summarizer_timeout;
        let result = tokio::time::timeout(
            timeout,
            self.ctx.summarizer().summarize(&standup.questions, responses),
        )
        .await;

        match result {
            Ok(Ok(analysis)) => summary_from_analysis(analysis, self.ctx.now()),
            Ok(Err(e)) => {
                warn!(standup_id = %standup.id, error = %e, "Summarizer failed, using fallback");
                fallback_summary(responses, standup.stats.total_expected, self.ctx.now())
            }
            Err(_) => {
                warn!(standup_id = %standup.id, timeout_secs = timeout.as_secs(), "Summarizer timed out, using fallback");
                fallback_summary(responses, standup.stats.total_expected, self.ctx.now())
            }
        }
    }
}
