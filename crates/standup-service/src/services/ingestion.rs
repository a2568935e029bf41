//! Response ingestion
//!
//! Turns thread replies into responses and re-checks completion after
//! every accepted reply.

use standup_core::{DomainError, Response, ResponseId, Standup, StandupId, StandupStatus};
use tracing::{debug, info, instrument, warn};

use super::completion::{CheckOutcome, CompletionService, Trigger};
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const RECORDED_REACTION: &str = "white_check_mark";
const EDITED_REACTION: &str = "pencil2";

/// A message delivered by the platform, reduced to what ingestion reads
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingReply {
    pub team_id: String,
    pub channel_id: String,
    pub user_id: Option<String>,
    pub text: String,
    pub ts: String,
    pub thread_ts: Option<String>,
    pub subtype: Option<String>,
    pub bot_id: Option<String>,
}

impl IncomingReply {
    fn parent_ts(&self) -> Option<&str> {
        self.thread_ts.as_deref().filter(|parent| *parent != self.ts)
    }
}

/// Why a message was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotThreadReply,
    SystemOrBot,
    FromBot,
    UnknownThread,
    StandupNotOpen(StandupStatus),
    NotExpected,
}

/// Result of ingesting one message
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Ignored(IgnoreReason),
    Created {
        response_id: ResponseId,
        completion: CheckOutcome,
    },
    Updated {
        response_id: ResponseId,
        edit_count: u32,
        completion: CheckOutcome,
    },
}

impl IngestOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

/// Response ingestion service
pub struct IngestionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IngestionService<'a> {
    /// Create a new IngestionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a thread reply as a new or edited response
    #[instrument(skip(self, reply), fields(channel_id = %reply.channel_id, ts = %reply.ts))]
    pub async fn ingest(&self, reply: &IncomingReply) -> ServiceResult<IngestOutcome> {
        let Some(parent_ts) = reply.parent_ts() else {
            return Ok(IngestOutcome::Ignored(IgnoreReason::NotThreadReply));
        };
        if reply.subtype.is_some() || reply.bot_id.is_some() {
            return Ok(IngestOutcome::Ignored(IgnoreReason::SystemOrBot));
        }
        let Some(user_id) = reply.user_id.as_deref() else {
            return Ok(IngestOutcome::Ignored(IgnoreReason::SystemOrBot));
        };

        if let Some(team) = self.ctx.team_repo().find(&reply.team_id).await? {
            if team.is_bot_user(user_id) {
                return Ok(IngestOutcome::Ignored(IgnoreReason::FromBot));
            }
        }

        let Some(standup) = self
            .ctx
            .standup_repo()
            .find_by_thread_ts(&reply.team_id, parent_ts)
            .await?
        else {
            return Ok(IngestOutcome::Ignored(IgnoreReason::UnknownThread));
        };
        if !standup.is_open() {
            debug!(status = %standup.status, "Reply to a closed standup");
            return Ok(IngestOutcome::Ignored(IgnoreReason::StandupNotOpen(standup.status)));
        }
        if !standup.is_expected(user_id) {
            debug!(user_id = %user_id, "Reply from a non-participant");
            return Ok(IngestOutcome::Ignored(IgnoreReason::NotExpected));
        }

        match self.ctx.response_repo().find(standup.id, user_id).await? {
            Some(existing) => self.apply_edit(&standup, existing, reply).await,
            None => self.create_response(&standup, user_id, reply, parent_ts).await,
        }
    }

    async fn create_response(
        &self,
        standup: &Standup,
        user_id: &str,
        reply: &IncomingReply,
        parent_ts: &str,
    ) -> ServiceResult<IngestOutcome> {
        let (username, display_name) = match self.ctx.platform().get_user_info(user_id).await {
            Ok(profile) => (profile.name, profile.display_name.or(profile.real_name)),
            Err(e) => {
                debug!(user_id = %user_id, error = %e, "Profile lookup failed, storing id only");
                (None, None)
            }
        };

        let response = Response::new(standup, user_id, &reply.text, &reply.ts, parent_ts, self.ctx.now())
            .with_names(username, display_name);

        match self.ctx.response_repo().create(&response).await {
            Ok(()) => {}
            Err(DomainError::DuplicateResponse) => {
                // Lost a race with a concurrent first reply; treat as an edit.
                let existing = self
                    .ctx
                    .response_repo()
                    .find(standup.id, user_id)
                    .await?
                    .ok_or(DomainError::ResponseNotFound)?;
                return self.apply_edit(standup, existing, reply).await;
            }
            Err(e) => return Err(e.into()),
        }

        self.refresh_participants(standup.id).await?;
        self.react(reply, RECORDED_REACTION).await;

        info!(
            standup_id = %standup.id,
            user_id = %user_id,
            complete = response.is_complete,
            "Response recorded"
        );

        let completion = CompletionService::new(self.ctx)
            .check_completion(standup.id, Trigger::Response)
            .await?;
        Ok(IngestOutcome::Created {
            response_id: response.id,
            completion,
        })
    }

    async fn apply_edit(
        &self,
        standup: &Standup,
        mut existing: Response,
        reply: &IncomingReply,
    ) -> ServiceResult<IngestOutcome> {
        existing.apply_edit(&reply.text, &reply.ts, standup.questions.len(), self.ctx.now());
        self.ctx.response_repo().update(&existing).await?;
        self.react(reply, EDITED_REACTION).await;

        info!(
            standup_id = %standup.id,
            user_id = %existing.user_id,
            edit_count = existing.edit_count,
            "Response updated"
        );

        let completion = CompletionService::new(self.ctx)
            .check_completion(standup.id, Trigger::Response)
            .await?;
        Ok(IngestOutcome::Updated {
            response_id: existing.id,
            edit_count: existing.edit_count,
            completion,
        })
    }

    /// Rebuild the participant list from stored responses
    ///
    /// Concurrent first replies each saved a stale standup; the response
    /// table is the source of truth.
    async fn refresh_participants(&self, standup_id: StandupId) -> ServiceResult<()> {
        let mut standup = self
            .ctx
            .standup_repo()
            .find_by_id(standup_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Standup", standup_id.to_string()))?;
        if !standup.is_open() {
            return Ok(());
        }

        let now = self.ctx.now();
        let responses = self.ctx.response_repo().find_by_standup(standup_id).await?;
        for response in &responses {
            standup.record_participant(&response.user_id, now);
        }
        if standup.has_all_responses() {
            standup.next_reminder_at = None;
        }
        self.ctx.standup_repo().save(&standup).await?;
        Ok(())
    }

    async fn react(&self, reply: &IncomingReply, emoji: &str) {
        if let Err(e) = self
            .ctx
            .platform()
            .add_reaction(&reply.channel_id, &reply.ts, emoji)
            .await
        {
            warn!(ts = %reply.ts, error = %e, "Failed to add reaction");
        }
    }
}
