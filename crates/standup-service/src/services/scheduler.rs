//! Scheduler driver
//!
//! Periodic tasks that start scheduled standups, sweep expired ones, send
//! due reminders, and delete old terminal standups. Every tick re-reads
//! state through the repositories; a failed tick is logged and retried on
//! the next interval.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Timelike};
use standup_common::SchedulerConfig;
use standup_core::{Schedule, SYSTEM_ACTOR};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::completion::{CheckOutcome, CompletionService, Trigger};
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::lifecycle::LifecycleService;
use super::reminder::ReminderService;

/// Standups deleted per cleanup query
const CLEANUP_BATCH: i64 = 500;

/// How often the cleanup task checks whether its hour has come
const CLEANUP_CHECK_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Timer periods for the scheduler tasks
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub start_interval: Duration,
    pub expiry_interval: Duration,
    pub reminder_interval: Duration,
    pub cleanup_hour_utc: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            start_interval: Duration::from_secs(60),
            expiry_interval: Duration::from_secs(5 * 60),
            reminder_interval: Duration::from_secs(2 * 60),
            cleanup_hour_utc: 2,
        }
    }
}

impl From<&SchedulerConfig> for SchedulerSettings {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            start_interval: Duration::from_secs(config.start_interval_secs.max(1)),
            expiry_interval: Duration::from_secs(config.expiry_interval_secs.max(1)),
            reminder_interval: Duration::from_secs(config.reminder_interval_secs.max(1)),
            cleanup_hour_utc: config.cleanup_hour_utc.min(23),
        }
    }
}

/// Drives the engines from timers
#[derive(Debug, Clone)]
pub struct Scheduler {
    ctx: Arc<ServiceContext>,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(ctx: Arc<ServiceContext>, settings: SchedulerSettings) -> Self {
        Self { ctx, settings }
    }

    /// Spawn one task per timer; all stop when `token` is cancelled
    pub fn spawn(self, token: CancellationToken) -> Vec<JoinHandle<()>> {
        let start = {
            let scheduler = self.clone();
            spawn_periodic("start", self.settings.start_interval, token.clone(), move || {
                let scheduler = scheduler.clone();
                async move {
                    scheduler.run_start_tick().await;
                }
            })
        };
        let expiry = {
            let scheduler = self.clone();
            spawn_periodic("expiry", self.settings.expiry_interval, token.clone(), move || {
                let scheduler = scheduler.clone();
                async move {
                    scheduler.run_expiry_tick().await;
                }
            })
        };
        let reminders = {
            let scheduler = self.clone();
            spawn_periodic("reminders", self.settings.reminder_interval, token.clone(), move || {
                let scheduler = scheduler.clone();
                async move {
                    scheduler.run_reminder_tick().await;
                }
            })
        };
        let cleanup = tokio::spawn(self.cleanup_loop(token));

        vec![start, expiry, reminders, cleanup]
    }

    /// Start every channel whose schedule is due now
    ///
    /// Returns the number of standups started.
    pub async fn run_start_tick(&self) -> usize {
        match self.start_due_channels().await {
            Ok(started) => started,
            Err(e) => {
                error!(error = %e, "Start tick failed");
                0
            }
        }
    }

    async fn start_due_channels(&self) -> ServiceResult<usize> {
        let now = self.ctx.now();
        let candidates = self
            .ctx
            .channel_repo()
            .find_scheduled_on(&Schedule::utc_weekday_window(now))
            .await?;

        let mut started = 0;
        for channel in candidates.into_iter().filter(|c| c.is_time_for_standup(now)) {
            let day_start = channel.config.schedule.local_day_start(now);
            let already = self
                .ctx
                .standup_repo()
                .has_started_since(&channel.team_id, &channel.channel_id, day_start)
                .await;
            match already {
                Ok(true) => {
                    debug!(channel_id = %channel.channel_id, "Standup already ran today");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(channel_id = %channel.channel_id, error = %e, "Failed to check today's standups");
                    continue;
                }
            }

            match LifecycleService::new(&self.ctx)
                .create_standup(&channel.team_id, &channel.channel_id, SYSTEM_ACTOR, false)
                .await
            {
                Ok(_) => started += 1,
                Err(e) if e.is_precondition() => {
                    info!(channel_id = %channel.channel_id, reason = %e, "Scheduled standup not started");
                }
                Err(e) => {
                    error!(channel_id = %channel.channel_id, error = %e, "Failed to start scheduled standup");
                }
            }
        }

        if started > 0 {
            info!(count = started, "Scheduled standups started");
        }
        Ok(started)
    }

    /// Complete standups past their deadline and finish stalled completions
    pub async fn run_expiry_tick(&self) -> usize {
        let completion = CompletionService::new(&self.ctx);
        let mut completed = match completion.recover_stalled().await {
            Ok(recovered) => recovered,
            Err(e) => {
                warn!(error = %e, "Stalled completion sweep failed");
                0
            }
        };

        let expired = match self.ctx.standup_repo().find_expired(self.ctx.now()).await {
            Ok(expired) => expired,
            Err(e) => {
                error!(error = %e, "Expiry tick failed");
                return completed;
            }
        };

        for standup in expired {
            match completion.check_completion(standup.id, Trigger::Sweep).await {
                Ok(CheckOutcome::Completed(_)) => completed += 1,
                Ok(_) => {}
                Err(e) => warn!(standup_id = %standup.id, error = %e, "Expiry check failed"),
            }
        }
        completed
    }

    /// Send due reminders
    pub async fn run_reminder_tick(&self) -> usize {
        match ReminderService::new(&self.ctx).process_due().await {
            Ok(sent) => sent,
            Err(e) => {
                error!(error = %e, "Reminder tick failed");
                0
            }
        }
    }

    /// Delete terminal standups older than the retention period, with
    /// their responses
    pub async fn run_cleanup(&self) -> ServiceResult<usize> {
        let cutoff = self.ctx.now() - chrono::Duration::days(self.ctx.settings().retention_days);
        let mut deleted = 0;

        loop {
            let ids = self
                .ctx
                .standup_repo()
                .find_terminal_before(cutoff, CLEANUP_BATCH)
                .await?;
            let batch = ids.len();
            for id in ids {
                self.ctx.response_repo().delete_by_standup(id).await?;
                self.ctx.standup_repo().delete(id).await?;
            }
            deleted += batch;
            if (batch as i64) < CLEANUP_BATCH {
                break;
            }
        }

        info!(deleted, cutoff = %cutoff, "Retention cleanup finished");
        Ok(deleted)
    }

    async fn cleanup_loop(self, token: CancellationToken) {
        let mut interval = tokio::time::interval(CLEANUP_CHECK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_run: Option<NaiveDate> = None;

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = interval.tick() => {
                    let now = self.ctx.now();
                    let today = now.date_naive();
                    if now.hour() != self.settings.cleanup_hour_utc || last_run == Some(today) {
                        continue;
                    }
                    last_run = Some(today);
                    if let Err(e) = self.run_cleanup().await {
                        error!(error = %e, "Retention cleanup failed");
                    }
                }
            }
        }
        debug!(task = "cleanup", "Scheduler task stopped");
    }
}

fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, token: CancellationToken, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(task = name, period_secs = period.as_secs(), "Scheduler task started");

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = interval.tick() => tick().await,
            }
        }
        debug!(task = name, "Scheduler task stopped");
    })
}
