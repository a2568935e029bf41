//! PostgreSQL implementation of ResponseRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use standup_core::entities::Response;
use standup_core::error::DomainError;
use standup_core::traits::{RepoResult, ResponseRepository};
use standup_core::value_objects::StandupId;

use crate::models::ResponseModel;

use super::error::{map_db_error, map_unique_violation, response_not_found};

const RESPONSE_COLUMNS: &str = r"
    id, standup_id, team_id, channel_id, user_id, username, user_display_name, answers,
    raw_message, message_ts, thread_ts, is_complete, is_edited, edit_count, submitted_at,
    last_edited_at, response_time_ms, created_at, updated_at
";

/// PostgreSQL implementation of ResponseRepository
#[derive(Clone)]
pub struct PgResponseRepository {
    pool: PgPool,
}

impl PgResponseRepository {
    /// Create a new PgResponseRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponseRepository for PgResponseRepository {
    #[instrument(skip(self))]
    async fn find(&self, standup_id: StandupId, user_id: &str) -> RepoResult<Option<Response>> {
        let result = sqlx::query_as::<_, ResponseModel>(&format!(
            "SELECT {RESPONSE_COLUMNS} FROM responses WHERE standup_id = $1 AND user_id = $2"
        ))
        .bind(standup_id.into_inner())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Response::from))
    }

    #[instrument(skip(self))]
    async fn find_by_standup(&self, standup_id: StandupId) -> RepoResult<Vec<Response>> {
        let results = sqlx::query_as::<_, ResponseModel>(&format!(
            "SELECT {RESPONSE_COLUMNS} FROM responses WHERE standup_id = $1 ORDER BY submitted_at"
        ))
        .bind(standup_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Response::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_recent_by_user(&self, team_id: &str, user_id: &str, limit: i64) -> RepoResult<Vec<Response>> {
        let results = sqlx::query_as::<_, ResponseModel>(&format!(
            r"
            SELECT {RESPONSE_COLUMNS} FROM responses
            WHERE team_id = $1 AND user_id = $2
            ORDER BY submitted_at DESC
            LIMIT $3
            "
        ))
        .bind(team_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Response::from).collect())
    }

    #[instrument(skip(self, response), fields(standup_id = %response.standup_id, user_id = %response.user_id))]
    async fn create(&self, response: &Response) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO responses (
                id, standup_id, team_id, channel_id, user_id, username, user_display_name,
                answers, raw_message, message_ts, thread_ts, is_complete, is_edited, edit_count,
                submitted_at, last_edited_at, response_time_ms, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19)
            ",
        )
        .bind(response.id.into_inner())
        .bind(response.standup_id.into_inner())
        .bind(&response.team_id)
        .bind(&response.channel_id)
        .bind(&response.user_id)
        .bind(&response.username)
        .bind(&response.user_display_name)
        .bind(&response.answers)
        .bind(&response.raw_message)
        .bind(&response.message_ts)
        .bind(&response.thread_ts)
        .bind(response.is_complete)
        .bind(response.is_edited)
        .bind(response.edit_count as i32)
        .bind(response.submitted_at)
        .bind(response.last_edited_at)
        .bind(response.response_time_ms)
        .bind(response.created_at)
        .bind(response.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateResponse))?;

        Ok(())
    }

    #[instrument(skip(self, response), fields(response_id = %response.id))]
    async fn update(&self, response: &Response) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE responses
            SET username = $2, user_display_name = $3, answers = $4, raw_message = $5,
                message_ts = $6, is_complete = $7, is_edited = $8, edit_count = $9,
                last_edited_at = $10, updated_at = $11
            WHERE id = $1
            ",
        )
        .bind(response.id.into_inner())
        .bind(&response.username)
        .bind(&response.user_display_name)
        .bind(&response.answers)
        .bind(&response.raw_message)
        .bind(&response.message_ts)
        .bind(response.is_complete)
        .bind(response.is_edited)
        .bind(response.edit_count as i32)
        .bind(response.last_edited_at)
        .bind(response.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(response_not_found());
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_standup(&self, standup_id: StandupId) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM responses WHERE standup_id = $1")
            .bind(standup_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
