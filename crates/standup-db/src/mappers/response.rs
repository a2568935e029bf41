//! Response entity <-> model mapper

use standup_core::entities::Response;
use standup_core::value_objects::{ResponseId, StandupId};

use crate::models::ResponseModel;

/// Convert ResponseModel to Response entity
impl From<ResponseModel> for Response {
    fn from(model: ResponseModel) -> Self {
        Response {
            id: ResponseId::from_uuid(model.id),
            standup_id: StandupId::from_uuid(model.standup_id),
            team_id: model.team_id,
            channel_id: model.channel_id,
            user_id: model.user_id,
            username: model.username,
            user_display_name: model.user_display_name,
            answers: model.answers,
            raw_message: model.raw_message,
            message_ts: model.message_ts,
            thread_ts: model.thread_ts,
            is_complete: model.is_complete,
            is_edited: model.is_edited,
            edit_count: model.edit_count.max(0) as u32,
            submitted_at: model.submitted_at,
            last_edited_at: model.last_edited_at,
            response_time_ms: model.response_time_ms,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
