//! Reminder service
//!
//! Nudges participants who have not answered yet: one in-thread mention
//! and a direct message each.

use futures::future::join_all;
use standup_core::{OutgoingMessage, ReminderKind, StandupId};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::lifecycle::auto_disable_channel;
use super::messages::{channel_reminder, dm_reminder};

/// Reminder service
pub struct ReminderService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReminderService<'a> {
    /// Create a new ReminderService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send every reminder that is due; returns how many standups were nudged
    #[instrument(skip(self))]
    pub async fn process_due(&self) -> ServiceResult<usize> {
        let due = self.ctx.standup_repo().find_reminders_due(self.ctx.now()).await?;
        let mut sent = 0;
        for standup in due {
            match self.send_reminders(standup.id).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => warn!(standup_id = %standup.id, error = %e, "Failed to send reminders"),
            }
        }
        if sent > 0 {
            info!(count = sent, "Reminders sent");
        }
        Ok(sent)
    }

    /// Remind everyone still missing from one standup
    ///
    /// Returns false when the standup is closed or nobody is missing. The
    /// standup is re-read before saving so a concurrent completion wins.
    #[instrument(skip(self))]
    pub async fn send_reminders(&self, standup_id: StandupId) -> ServiceResult<bool> {
        let Some(mut standup) = self.ctx.standup_repo().find_by_id(standup_id).await? else {
            return Ok(false);
        };
        if !standup.is_open() {
            return Ok(false);
        }

        let missing = standup.missing_participants();
        if missing.is_empty() {
            standup.next_reminder_at = None;
            standup.updated_at = self.ctx.now();
            self.ctx.standup_repo().save(&standup).await?;
            return Ok(false);
        }

        let remaining = standup.time_remaining(self.ctx.now());
        let mut channel_sent = false;
        let mut permalink = None;

        if let Some(thread_ts) = standup.thread_ts.as_deref() {
            let message = OutgoingMessage::new(&standup.channel_id, channel_reminder(&missing, remaining))
                .in_thread(thread_ts);
            match self.ctx.platform().post_message(message).await {
                Ok(_) => channel_sent = true,
                Err(e) => {
                    warn!(standup_id = %standup_id, error = %e, "Failed to post channel reminder");
                    if e.is_bot_removed() {
                        auto_disable_channel(self.ctx, &standup.team_id, &standup.channel_id, "bot_removed").await;
                    }
                }
            }

            permalink = match self.ctx.platform().get_permalink(&standup.channel_id, thread_ts).await {
                Ok(link) => link,
                Err(e) => {
                    debug!(error = %e, "Permalink unavailable");
                    None
                }
            };
        }

        let text = dm_reminder(remaining, permalink.as_deref());
        let results = join_all(
            missing
                .iter()
                .map(|user_id| self.ctx.platform().send_direct_message(user_id, &text)),
        )
        .await;
        let mut delivered = Vec::new();
        for (user_id, result) in missing.iter().zip(results) {
            match result {
                Ok(_) => delivered.push(user_id.clone()),
                Err(e) => warn!(user_id = %user_id, error = %e, "Failed to send reminder DM"),
            }
        }

        let Some(mut current) = self.ctx.standup_repo().find_by_id(standup_id).await? else {
            return Ok(true);
        };
        if !current.is_open() {
            debug!(status = %current.status, "Standup closed while reminding");
            return Ok(true);
        }

        let now = self.ctx.now();
        if channel_sent {
            current.record_reminder(ReminderKind::Channel, None, now);
        }
        for user_id in &delivered {
            current.record_reminder(ReminderKind::Dm, Some(user_id.clone()), now);
        }

        current.next_reminder_at = None;
        if let Some(channel) = self
            .ctx
            .channel_repo()
            .find(&current.team_id, &current.channel_id)
            .await?
        {
            if channel.config.enable_reminders {
                let next = now + channel.config.reminder_interval;
                if next < current.response_deadline {
                    current.next_reminder_at = Some(next);
                }
            }
        }
        current.updated_at = now;
        self.ctx.standup_repo().save(&current).await?;

        info!(
            standup_id = %standup_id,
            missing = missing.len(),
            dms = delivered.len(),
            channel = channel_sent,
            "Reminders sent"
        );
        Ok(true)
    }
}
