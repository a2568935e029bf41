//! Channel entity <-> model mapper

use chrono::Duration;
use standup_core::entities::{Channel, ChannelConfig, ChannelStats, ChannelStatus};
use standup_core::error::DomainError;
use standup_core::value_objects::{parse_timezone, Schedule, TimeOfDay};

use crate::models::ChannelModel;

/// Rebuild the schedule from its stored columns
fn parse_schedule(model: &ChannelModel) -> Result<Schedule, DomainError> {
    let time = TimeOfDay::parse(&model.schedule_time)?;
    let weekdays = model
        .schedule_days
        .iter()
        .map(|&d| u8::try_from(d).unwrap_or(u8::MAX))
        .collect();
    let timezone = parse_timezone(&model.timezone)?;
    Ok(Schedule::new(time, weekdays, timezone)?)
}

/// Convert ChannelModel to Channel entity
///
/// Fails when the stored schedule no longer parses.
impl TryFrom<ChannelModel> for Channel {
    type Error = DomainError;

    fn try_from(model: ChannelModel) -> Result<Self, Self::Error> {
        let schedule = parse_schedule(&model).map_err(|e| {
            DomainError::DatabaseError(format!(
                "corrupt schedule for channel {}/{}: {e}",
                model.team_id, model.channel_id
            ))
        })?;

        Ok(Channel {
            config: ChannelConfig {
                questions: model.questions,
                schedule,
                participants: model.participants,
                response_timeout: Duration::minutes(i64::from(model.response_timeout_minutes)),
                reminder_interval: Duration::minutes(i64::from(model.reminder_interval_minutes)),
                enable_reminders: model.enable_reminders,
            },
            status: ChannelStatus::from(model.status.as_str()),
            is_active: model.is_active,
            stats: ChannelStats {
                total_standups: model.total_standups.max(0) as u32,
                last_standup_at: model.last_standup_at,
                avg_response_rate: model.avg_response_rate,
                avg_response_time_ms: model.avg_response_time_ms,
            },
            team_id: model.team_id,
            channel_id: model.channel_id,
            channel_name: model.channel_name,
            configured_by: model.configured_by,
            disabled_at: model.disabled_at,
            disabled_reason: model.disabled_reason,
            auto_disabled: model.auto_disabled,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Column values derived from a Channel entity for insert/update
pub struct ChannelValues<'a> {
    pub channel: &'a Channel,
    pub schedule_time: String,
    pub schedule_days: Vec<i16>,
    pub timezone: &'static str,
    pub response_timeout_minutes: i32,
    pub reminder_interval_minutes: i32,
    pub status: &'static str,
    pub total_standups: i32,
}

impl<'a> ChannelValues<'a> {
    pub fn new(channel: &'a Channel) -> Self {
        let config = &channel.config;
        Self {
            channel,
            schedule_time: config.schedule.time.to_string(),
            schedule_days: config.schedule.weekdays().iter().map(|&d| i16::from(d)).collect(),
            timezone: config.schedule.timezone.name(),
            response_timeout_minutes: config.response_timeout.num_minutes() as i32,
            reminder_interval_minutes: config.reminder_interval.num_minutes() as i32,
            status: channel.status.as_str(),
            total_standups: channel.stats.total_standups as i32,
        }
    }
}
