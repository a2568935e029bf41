//! Standup entity <-> model mapper

use standup_core::entities::{Standup, StandupStatus};
use standup_core::value_objects::StandupId;

use crate::models::StandupModel;

/// Convert StandupModel to Standup entity
impl From<StandupModel> for Standup {
    fn from(model: StandupModel) -> Self {
        Standup {
            id: StandupId::from_uuid(model.id),
            team_id: model.team_id,
            channel_id: model.channel_id,
            status: StandupStatus::from(model.status.as_str()),
            questions: model.questions,
            expected_participants: model.expected_participants,
            actual_participants: model.actual_participants,
            created_by: model.created_by,
            is_manual: model.is_manual,
            scheduled_date: model.scheduled_date,
            started_at: model.started_at,
            response_deadline: model.response_deadline,
            completed_at: model.completed_at,
            message_ts: model.message_ts,
            thread_ts: model.thread_ts,
            summary_message_ts: model.summary_message_ts,
            cancelled_by: model.cancelled_by,
            cancel_reason: model.cancel_reason,
            stats: model.stats.0,
            reminders: model.reminders.0,
            next_reminder_at: model.next_reminder_at,
            away: model.away.0,
            summary: model.summary.map(|s| s.0),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
