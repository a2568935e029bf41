//! Reporting service
//!
//! Read-only views over a channel's standups for the status and debug
//! commands.

use chrono::{DateTime, Utc};
use standup_core::{Channel, DomainError, Response, ResponseStats, Standup};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::messages::{mention, next_run_label, time_left_sentence, truncate, MAX_MESSAGE_CHARS};

const RECENT_LIMIT: i64 = 5;

/// Channel overview for the status command
#[derive(Debug, Clone)]
pub struct ChannelStatusReport {
    pub channel: Channel,
    pub active: Option<Standup>,
    /// Most recent first, including the active one
    pub recent: Vec<Standup>,
}

/// Everything known about the active standup
#[derive(Debug, Clone)]
pub struct DebugReport {
    pub standup: Standup,
    pub responses: Vec<Response>,
    pub response_stats: ResponseStats,
    pub missing: Vec<String>,
}

/// Reporting service
pub struct ReportingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReportingService<'a> {
    /// Create a new ReportingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn channel_status(&self, team_id: &str, channel_id: &str) -> ServiceResult<ChannelStatusReport> {
        let channel = self
            .ctx
            .channel_repo()
            .find(team_id, channel_id)
            .await?
            .ok_or(DomainError::ChannelNotConfigured)?;

        let active = self
            .ctx
            .standup_repo()
            .find_active(team_id, channel_id)
            .await?
            .into_iter()
            .next();
        let recent = self
            .ctx
            .standup_repo()
            .find_recent(team_id, channel_id, RECENT_LIMIT)
            .await?;

        Ok(ChannelStatusReport { channel, active, recent })
    }

    /// Dump of the active standup; `None` when nothing is running
    #[instrument(skip(self))]
    pub async fn debug_active(&self, team_id: &str, channel_id: &str) -> ServiceResult<Option<DebugReport>> {
        let Some(standup) = self
            .ctx
            .standup_repo()
            .find_active(team_id, channel_id)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let responses = self.ctx.response_repo().find_by_standup(standup.id).await?;
        let response_stats = ResponseStats::from_responses(&responses);
        let missing = standup.missing_participants();

        Ok(Some(DebugReport {
            standup,
            responses,
            response_stats,
            missing,
        }))
    }
}

/// Text for the status command
pub fn format_status(report: &ChannelStatusReport, now: DateTime<Utc>) -> String {
    let channel = &report.channel;
    let schedule = &channel.config.schedule;
    let days: Vec<&str> = schedule
        .weekdays()
        .iter()
        .filter_map(|d| standup_core::WEEKDAY_NAMES.get(usize::from(*d)).copied())
        .collect();

    let mut text = format!(
        "📋 *Standup status for #{}*\n\nStatus: *{}*\nSchedule: {} at {} ({})\nQuestions: {}\nReminders: {}",
        channel.display_name(),
        if channel.is_active { channel.status.as_str() } else { "disabled" },
        days.join(", "),
        schedule.time,
        schedule.timezone.name(),
        channel.config.questions.len(),
        if channel.config.enable_reminders {
            format!("every {} min", channel.config.reminder_interval.num_minutes())
        } else {
            "off".to_string()
        },
    );

    if let Some(reason) = channel.disabled_reason.as_deref() {
        text.push_str(&format!("\nDisabled reason: {reason}"));
    }
    if channel.is_runnable() {
        text.push_str(&format!("\nNext run: {}", next_run_label(channel, now)));
    }

    match &report.active {
        Some(standup) => {
            text.push_str(&format!(
                "\n\n🟢 *Active standup:* {}/{} responded ({}%)\n{}",
                standup.stats.total_responded,
                standup.stats.total_expected,
                standup.response_rate_rounded(),
                time_left_sentence(standup.time_remaining(now))
            ));
            let missing = standup.missing_participants();
            if !missing.is_empty() {
                let mentions: Vec<String> = missing.iter().map(|u| mention(u)).collect();
                text.push_str(&format!("\nWaiting on: {}", mentions.join(", ")));
            }
        }
        None => text.push_str("\n\nNo standup is running."),
    }

    let history: Vec<String> = report
        .recent
        .iter()
        .filter(|s| !s.is_open())
        .map(|s| {
            format!(
                "• {} {} {}% ({}/{})",
                s.started_at.with_timezone(&schedule.timezone).format("%Y-%m-%d"),
                s.status,
                s.response_rate_rounded(),
                s.stats.total_responded,
                s.stats.total_expected
            )
        })
        .collect();
    if !history.is_empty() {
        text.push_str(&format!("\n\n*Recent:*\n{}", history.join("\n")));
    }

    text.push_str(&format!(
        "\n\nTotal standups: {} · Avg response rate: {:.0}%",
        channel.stats.total_standups, channel.stats.avg_response_rate
    ));

    truncate(&text, MAX_MESSAGE_CHARS)
}

/// Text for the debug command
pub fn format_debug(report: &DebugReport, now: DateTime<Utc>) -> String {
    let s = &report.standup;
    let mut text = format!(
        "🔍 *Standup debug*\nid: `{}`\nstatus: {}\nthread: {}\nstarted: {}\ndeadline: {} ({} min left)\nexpected: {}\nresponded: {}\nreminders sent: {}\nnext reminder: {}\naway: {}/{}",
        s.id,
        s.status,
        s.thread_ts.as_deref().unwrap_or("-"),
        s.started_at.to_rfc3339(),
        s.response_deadline.to_rfc3339(),
        s.time_remaining(now).num_minutes(),
        s.stats.total_expected,
        s.stats.total_responded,
        s.stats.reminders_sent,
        s.next_reminder_at.map_or_else(|| "-".to_string(), |t| t.to_rfc3339()),
        s.away.away_count(),
        s.away.total_original,
    );

    text.push_str(&format!(
        "\n\nresponses: {} ({} complete, {} partial)",
        report.response_stats.total, report.response_stats.complete, report.response_stats.incomplete
    ));
    for r in &report.responses {
        text.push_str(&format!(
            "\n• {} answers={} complete={} edits={}",
            mention(&r.user_id),
            r.answers.len(),
            r.is_complete,
            r.edit_count
        ));
    }
    if !report.missing.is_empty() {
        let mentions: Vec<String> = report.missing.iter().map(|u| mention(u)).collect();
        text.push_str(&format!("\nmissing: {}", mentions.join(", ")));
    }

    truncate(&text, MAX_MESSAGE_CHARS)
}
