//! Slack Events API handler
//!
//! Slack expects an answer within three seconds, so deliveries are
//! acknowledged immediately and processed on a spawned task.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use standup_service::{ChannelService, IncomingReply, IngestionService, ServiceContext, TeamService};
use standup_slack::{EventCallback, EventPayload, MessageEvent, SlackEvent};
use tracing::{debug, info, warn, Instrument};

use crate::extractors::SlackJson;
use crate::state::AppState;

const RETRY_HEADER: &str = "x-slack-retry-num";

/// POST /slack/events
pub async fn handle_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    SlackJson(payload): SlackJson<EventPayload>,
) -> Response {
    match payload {
        EventPayload::UrlVerification { challenge } => Json(json!({ "challenge": challenge })).into_response(),
        EventPayload::EventCallback(callback) => {
            // Every delivery is acked at once, so a retry means the first copy was received
            if let Some(retry) = headers.get(RETRY_HEADER).and_then(|v| v.to_str().ok()) {
                debug!(retry = %retry, event_id = ?callback.event_id, "Ignoring Slack retry");
                return StatusCode::OK.into_response();
            }

            let span = tracing::info_span!("slack_event", team_id = %callback.team_id, event_id = ?callback.event_id);
            tokio::spawn(dispatch_event(state.service_context_arc(), callback).instrument(span));
            StatusCode::OK.into_response()
        }
        EventPayload::Unknown => StatusCode::OK.into_response(),
    }
}

async fn dispatch_event(ctx: Arc<ServiceContext>, callback: EventCallback) {
    let team_id = callback.team_id.as_str();

    if let Some(bot_user_id) = callback.bot_user_id() {
        if let Err(e) = TeamService::new(&ctx).ensure_bot_user(team_id, bot_user_id).await {
            warn!(error = %e, "Failed to record team bot user");
        }
    }

    match &callback.event {
        SlackEvent::Message(message) => {
            let reply = incoming_reply(team_id, message);
            match IngestionService::new(&ctx).ingest(&reply).await {
                Ok(outcome) => debug!(outcome = ?outcome, "Message processed"),
                Err(e) if e.is_precondition() => debug!(reason = %e, "Message not ingested"),
                Err(e) => warn!(channel_id = %message.channel, error = %e, "Failed to ingest message"),
            }
        }
        SlackEvent::MemberLeftChannel { user, channel } => {
            match ChannelService::new(&ctx).handle_member_left(team_id, channel, user).await {
                Ok(change) => info!(channel_id = %channel, user_id = %user, change = ?change, "Member left channel"),
                Err(e) => warn!(channel_id = %channel, error = %e, "Failed to handle member_left_channel"),
            }
        }
        SlackEvent::ChannelRename { channel } => {
            if let Err(e) = ChannelService::new(&ctx)
                .handle_channel_renamed(team_id, &channel.id, &channel.name)
                .await
            {
                warn!(channel_id = %channel.id, error = %e, "Failed to handle channel_rename");
            }
        }
        SlackEvent::ChannelDeleted { channel } => {
            ChannelService::new(&ctx)
                .handle_channel_gone(team_id, channel, "channel_deleted")
                .await;
        }
        SlackEvent::ChannelArchive { channel } => {
            ChannelService::new(&ctx)
                .handle_channel_gone(team_id, channel, "channel_archived")
                .await;
        }
        SlackEvent::Other => debug!("Unhandled event type"),
    }
}

fn incoming_reply(team_id: &str, message: &MessageEvent) -> IncomingReply {
    IncomingReply {
        team_id: team_id.to_string(),
        channel_id: message.channel.clone(),
        user_id: message.user.clone(),
        text: message.text.clone(),
        ts: message.ts.clone(),
        thread_ts: message.thread_ts.clone(),
        subtype: message.subtype.clone(),
        bot_id: message.bot_id.clone(),
    }
}
