//! Slash command handler
//!
//! Each command is a thin wrapper over one engine call. Replies are always
//! HTTP 200 with ephemeral text, because Slack only shows a command's reply
//! body on success.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use standup_core::{Channel, ChannelStatus, DomainError, Standup, WEEKDAY_NAMES};
use standup_service::messages::{mention, next_run_label, time_left_sentence};
use standup_service::{
    format_debug, format_status, ChannelConfigInput, ChannelService, CommandReply, CompletionReason,
    CompletionService, LifecycleService, ReminderService, ReportingService, ServiceContext, ServiceError,
    ServiceResult,
};
use standup_slack::SlashCommand;
use tracing::{error, info, instrument};

use crate::extractors::SlackForm;
use crate::state::AppState;

const DEFAULT_CANCEL_REASON: &str = "Manual cancellation";

/// Commands understood by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Setup,
    Start,
    Status,
    Complete,
    Remind,
    Cancel,
    Debug,
    Pause,
    Resume,
}

impl Command {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "standup-setup" => Self::Setup,
            "standup-start" => Self::Start,
            "standup-status" => Self::Status,
            "standup-complete" => Self::Complete,
            "standup-remind" => Self::Remind,
            "standup-cancel" => Self::Cancel,
            "standup-debug" => Self::Debug,
            "standup-pause" => Self::Pause,
            "standup-resume" => Self::Resume,
            _ => return None,
        })
    }
}

/// POST /slack/commands
pub async fn handle_command(
    State(state): State<AppState>,
    SlackForm(command): SlackForm<SlashCommand>,
) -> Json<CommandReply> {
    let Some(kind) = Command::parse(command.name()) else {
        return Json(CommandReply::ephemeral(format!(
            "Unknown command `{}`. Try `/standup-status`.",
            command.command
        )));
    };

    let ctx = state.service_context();
    let reply = match run_command(ctx, kind, &command).await {
        Ok(reply) => reply,
        Err(e) => error_reply(&e, kind),
    };
    Json(reply)
}

#[instrument(skip(ctx, command), fields(team_id = %command.team_id, channel_id = %command.channel_id, user_id = %command.user_id))]
async fn run_command(ctx: &ServiceContext, kind: Command, command: &SlashCommand) -> ServiceResult<CommandReply> {
    let team_id = command.team_id.as_str();
    let channel_id = command.channel_id.as_str();
    let user_id = command.user_id.as_str();
    let args = command.text.trim();

    match kind {
        Command::Setup => {
            let input = ChannelConfigInput::parse_args(args)?;
            let channel = ChannelService::new(ctx)
                .configure_channel(team_id, channel_id, user_id, input, command.channel_name.clone())
                .await?;
            Ok(CommandReply::ephemeral(setup_confirmation(&channel, ctx.now())))
        }
        Command::Start => {
            let standup = LifecycleService::new(ctx)
                .create_standup(team_id, channel_id, user_id, true)
                .await?;
            Ok(CommandReply::ephemeral(start_confirmation(&standup, ctx.now())))
        }
        Command::Status => {
            let report = ReportingService::new(ctx).channel_status(team_id, channel_id).await?;
            Ok(CommandReply::ephemeral(format_status(&report, ctx.now())))
        }
        Command::Complete => {
            let active = LifecycleService::new(ctx).require_active(team_id, channel_id).await?;
            let standup = CompletionService::new(ctx)
                .complete_standup(active.id, CompletionReason::Manual)
                .await?;
            info!(standup_id = %standup.id, "Standup completed by command");
            Ok(CommandReply::ephemeral(format!(
                "✅ Standup completed with {}/{} responses ({}%).",
                standup.stats.total_responded,
                standup.stats.total_expected,
                standup.response_rate_rounded()
            )))
        }
        Command::Remind => {
            let active = LifecycleService::new(ctx).require_active(team_id, channel_id).await?;
            let sent = ReminderService::new(ctx).send_reminders(active.id).await?;
            Ok(CommandReply::ephemeral(if sent {
                "🔔 Reminders sent to everyone who hasn't responded yet."
            } else {
                "Everyone has already responded. No reminders needed."
            }))
        }
        Command::Cancel => {
            let active = LifecycleService::new(ctx).require_active(team_id, channel_id).await?;
            let reason = if args.is_empty() { DEFAULT_CANCEL_REASON } else { args };
            let cancelled = LifecycleService::new(ctx)
                .cancel_standup(active.id, user_id, reason)
                .await?;
            Ok(CommandReply::ephemeral(if cancelled {
                "🛑 Standup cancelled."
            } else {
                "That standup has already finished."
            }))
        }
        Command::Debug => {
            let report = ReportingService::new(ctx).debug_active(team_id, channel_id).await?;
            Ok(CommandReply::ephemeral(match report {
                Some(report) => format_debug(&report, ctx.now()),
                None => "No active standup in this channel.".to_string(),
            }))
        }
        Command::Pause => {
            ChannelService::new(ctx)
                .set_channel_status(team_id, channel_id, ChannelStatus::Paused)
                .await?;
            Ok(CommandReply::ephemeral(
                "⏸️ Scheduled standups paused. Run `/standup-resume` to turn them back on.",
            ))
        }
        Command::Resume => {
            let channel = ChannelService::new(ctx)
                .set_channel_status(team_id, channel_id, ChannelStatus::Active)
                .await?;
            Ok(CommandReply::ephemeral(format!(
                "▶️ Scheduled standups resumed. Next run: {}",
                next_run_label(&channel, ctx.now())
            )))
        }
    }
}

fn setup_confirmation(channel: &Channel, now: DateTime<Utc>) -> String {
    let schedule = &channel.config.schedule;
    let days: Vec<&str> = schedule
        .weekdays()
        .iter()
        .filter_map(|d| WEEKDAY_NAMES.get(usize::from(*d)).copied())
        .collect();
    let participants = if channel.config.participants.is_empty() {
        "all channel members".to_string()
    } else {
        channel
            .config
            .participants
            .iter()
            .map(|u| mention(u))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "✅ Standup configured for #{}\nSchedule: {} at {} ({})\nQuestions: {}\nParticipants: {}\nNext run: {}",
        channel.display_name(),
        days.join(", "),
        schedule.time,
        schedule.timezone.name(),
        channel.config.questions.len(),
        participants,
        next_run_label(channel, now)
    )
}

fn start_confirmation(standup: &Standup, now: DateTime<Utc>) -> String {
    let mut text = format!(
        "🚀 Standup started with {} participant(s). {}",
        standup.expected_participants.len(),
        time_left_sentence(standup.time_remaining(now))
    );
    let away = standup.away.away_count();
    if away > 0 {
        text.push_str(&format!("\n{away} participant(s) are away and were skipped."));
    }
    text
}

/// User-facing text for a failed command
fn error_reply(err: &ServiceError, kind: Command) -> CommandReply {
    let text = match err.as_domain() {
        Some(DomainError::ChannelNotConfigured) => {
            "Standups aren't set up in this channel yet. Run `/standup-setup` first.".to_string()
        }
        Some(DomainError::ChannelInactive(status)) => {
            format!("Standups are {status} for this channel. Run `/standup-resume` to turn them back on.")
        }
        Some(DomainError::StandupAlreadyActive) => "A standup is already running in this channel.".to_string(),
        Some(DomainError::NoParticipants) => {
            "No participants found. Add people to the channel or set `participants=` with `/standup-setup`."
                .to_string()
        }
        Some(DomainError::StandupSkippedAllAway { away, total }) => {
            format!("Standup skipped: {away} of {total} participants are out of office.")
        }
        Some(DomainError::StandupNotOpen(_)) => "That standup has already finished.".to_string(),
        Some(DomainError::BotRemoved(_)) if kind == Command::Setup => {
            "I can't access this channel. Invite me with `/invite @standup` first.".to_string()
        }
        Some(DomainError::BotRemoved(_)) => {
            "I can't post in this channel anymore. Invite me back, then run `/standup-resume`.".to_string()
        }
        Some(e) if e.is_validation() => format!("⚠️ {e}"),
        _ => match err {
            ServiceError::NotFound { .. } => "No active standup in this channel.".to_string(),
            ServiceError::Validation(msg) => format!("⚠️ {msg}"),
            _ => {
                error!(command = ?kind, error = %err, "Command failed");
                "Something went wrong. Please try again in a moment.".to_string()
            }
        },
    };
    CommandReply::ephemeral(text)
}
