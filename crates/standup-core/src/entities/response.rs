//! Response entity - one participant's answers for one standup

use chrono::{DateTime, Utc};

use crate::entities::Standup;
use crate::value_objects::{ResponseId, StandupId};

/// Split a reply into answers aligned to `question_count` questions.
///
/// Non-empty trimmed lines are assigned to questions in order; missing
/// trailing answers are empty strings and extra lines are dropped. A
/// multi-line answer to one question is indistinguishable from answers to
/// several questions.
pub fn parse_answers(text: &str, question_count: usize) -> Vec<String> {
    let mut lines = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty());

    (0..question_count)
        .map(|_| lines.next().unwrap_or_default().to_string())
        .collect()
}

/// Response entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub id: ResponseId,
    pub standup_id: StandupId,
    pub team_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub user_display_name: Option<String>,
    /// Positionally aligned to the standup's questions
    pub answers: Vec<String>,
    pub raw_message: String,
    pub message_ts: String,
    pub thread_ts: String,
    pub is_complete: bool,
    pub is_edited: bool,
    pub edit_count: u32,
    pub submitted_at: DateTime<Utc>,
    pub last_edited_at: Option<DateTime<Utc>>,
    /// Milliseconds from standup start to first submission
    pub response_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Response {
    /// Create a first response by parsing a reply against the standup's questions
    pub fn new(
        standup: &Standup,
        user_id: impl Into<String>,
        raw_message: impl Into<String>,
        message_ts: impl Into<String>,
        thread_ts: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let raw_message = raw_message.into();
        let answers = parse_answers(&raw_message, standup.questions.len());
        let response_time = (now - standup.started_at).num_milliseconds().max(0);

        Self {
            id: ResponseId::generate(),
            standup_id: standup.id,
            team_id: standup.team_id.clone(),
            channel_id: standup.channel_id.clone(),
            user_id: user_id.into(),
            username: None,
            user_display_name: None,
            is_complete: answers_complete(&answers),
            answers,
            raw_message,
            message_ts: message_ts.into(),
            thread_ts: thread_ts.into(),
            is_edited: false,
            edit_count: 0,
            submitted_at: now,
            last_edited_at: None,
            response_time_ms: Some(response_time),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the author's names
    pub fn with_names(mut self, username: Option<String>, display_name: Option<String>) -> Self {
        self.username = username;
        self.user_display_name = display_name;
        self
    }

    /// Replace the answers from a newer reply
    pub fn apply_edit(
        &mut self,
        raw_message: impl Into<String>,
        message_ts: impl Into<String>,
        question_count: usize,
        now: DateTime<Utc>,
    ) {
        self.raw_message = raw_message.into();
        self.answers = parse_answers(&self.raw_message, question_count);
        self.is_complete = answers_complete(&self.answers);
        self.message_ts = message_ts.into();
        self.is_edited = true;
        self.edit_count += 1;
        self.last_edited_at = Some(now);
        self.updated_at = now;
    }

    /// Name to show in summaries
    pub fn author_label(&self) -> &str {
        self.user_display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.user_id)
    }
}

fn answers_complete(answers: &[String]) -> bool {
    answers.iter().all(|a| !a.trim().is_empty())
}

/// Aggregate counts over a standup's responses
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseStats {
    pub total: usize,
    pub complete: usize,
    pub incomplete: usize,
    /// Mean over responses that have a recorded response time
    pub avg_response_time_ms: Option<i64>,
}

impl ResponseStats {
    pub fn from_responses(responses: &[Response]) -> Self {
        let complete = responses.iter().filter(|r| r.is_complete).count();
        let times: Vec<i64> = responses.iter().filter_map(|r| r.response_time_ms).collect();
        let avg_response_time_ms = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<i64>() / times.len() as i64)
        };

        Self {
            total: responses.len(),
            complete,
            incomplete: responses.len() - complete,
            avg_response_time_ms,
        }
    }
}
