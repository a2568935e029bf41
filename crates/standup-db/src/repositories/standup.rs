//! PostgreSQL implementation of StandupRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use tracing::instrument;

use standup_core::entities::{Standup, StandupStatus};
use standup_core::error::DomainError;
use standup_core::traits::{RepoResult, StandupRepository};
use standup_core::value_objects::StandupId;

use crate::models::{IdRow, StandupModel};

use super::error::{map_db_error, map_unique_violation, standup_not_found};

const STANDUP_COLUMNS: &str = r"
    id, team_id, channel_id, status, questions, expected_participants, actual_participants,
    created_by, is_manual, scheduled_date, started_at, response_deadline, completed_at,
    message_ts, thread_ts, summary_message_ts, cancelled_by, cancel_reason, stats,
    reminders, next_reminder_at, away, summary, created_at, updated_at
";

const INSERT_STANDUP: &str = r"
    INSERT INTO standups (
        id, team_id, channel_id, status, questions, expected_participants, actual_participants,
        created_by, is_manual, scheduled_date, started_at, response_deadline, completed_at,
        message_ts, thread_ts, summary_message_ts, cancelled_by, cancel_reason, stats,
        reminders, next_reminder_at, away, summary, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
            $18, $19, $20, $21, $22, $23, $24, $25)
";

/// Row-level form of `StandupStatus::accepts_write` for the upsert
const SAVE_GUARD: &str = r"
    WHERE standups.status = EXCLUDED.status
       OR standups.status IN ('scheduled', 'active', 'collecting')
       OR (standups.status = 'analyzing' AND EXCLUDED.status IN ('completed', 'cancelled', 'expired'))
";

/// PostgreSQL implementation of StandupRepository
#[derive(Clone)]
pub struct PgStandupRepository {
    pool: PgPool,
}

impl PgStandupRepository {
    /// Create a new PgStandupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Bind every column of a standup in `STANDUP_COLUMNS` order
fn bind_standup<'q>(
    query: Query<'q, Postgres, PgArguments>,
    standup: &'q Standup,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(standup.id.into_inner())
        .bind(&standup.team_id)
        .bind(&standup.channel_id)
        .bind(standup.status.as_str())
        .bind(&standup.questions)
        .bind(&standup.expected_participants)
        .bind(&standup.actual_participants)
        .bind(&standup.created_by)
        .bind(standup.is_manual)
        .bind(standup.scheduled_date)
        .bind(standup.started_at)
        .bind(standup.response_deadline)
        .bind(standup.completed_at)
        .bind(&standup.message_ts)
        .bind(&standup.thread_ts)
        .bind(&standup.summary_message_ts)
        .bind(&standup.cancelled_by)
        .bind(&standup.cancel_reason)
        .bind(Json(&standup.stats))
        .bind(Json(&standup.reminders))
        .bind(standup.next_reminder_at)
        .bind(Json(&standup.away))
        .bind(standup.summary.as_ref().map(Json))
        .bind(standup.created_at)
        .bind(standup.updated_at)
}

#[async_trait]
impl StandupRepository for PgStandupRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: StandupId) -> RepoResult<Option<Standup>> {
        let result = sqlx::query_as::<_, StandupModel>(&format!(
            "SELECT {STANDUP_COLUMNS} FROM standups WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Standup::from))
    }

    #[instrument(skip(self))]
    async fn find_by_thread_ts(&self, team_id: &str, thread_ts: &str) -> RepoResult<Option<Standup>> {
        let result = sqlx::query_as::<_, StandupModel>(&format!(
            "SELECT {STANDUP_COLUMNS} FROM standups WHERE team_id = $1 AND thread_ts = $2"
        ))
        .bind(team_id)
        .bind(thread_ts)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Standup::from))
    }

    #[instrument(skip(self))]
    async fn find_active(&self, team_id: &str, channel_id: &str) -> RepoResult<Vec<Standup>> {
        let results = sqlx::query_as::<_, StandupModel>(&format!(
            r"
            SELECT {STANDUP_COLUMNS} FROM standups
            WHERE team_id = $1 AND channel_id = $2 AND status IN ('active', 'collecting')
            ORDER BY started_at DESC
            "
        ))
        .bind(team_id)
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Standup::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_recent(&self, team_id: &str, channel_id: &str, limit: i64) -> RepoResult<Vec<Standup>> {
        let results = sqlx::query_as::<_, StandupModel>(&format!(
            r"
            SELECT {STANDUP_COLUMNS} FROM standups
            WHERE team_id = $1 AND channel_id = $2
            ORDER BY started_at DESC
            LIMIT $3
            "
        ))
        .bind(team_id)
        .bind(channel_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Standup::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_expired(&self, now: DateTime<Utc>) -> RepoResult<Vec<Standup>> {
        let results = sqlx::query_as::<_, StandupModel>(&format!(
            r"
            SELECT {STANDUP_COLUMNS} FROM standups
            WHERE status IN ('active', 'collecting') AND response_deadline < $1
            ORDER BY response_deadline
            "
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Standup::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_reminders_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<Standup>> {
        let results = sqlx::query_as::<_, StandupModel>(&format!(
            r"
            SELECT {STANDUP_COLUMNS} FROM standups
            WHERE status IN ('active', 'collecting')
              AND next_reminder_at IS NOT NULL
              AND next_reminder_at <= $1
            ORDER BY next_reminder_at
            "
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Standup::from).collect())
    }

    #[instrument(skip(self))]
    async fn has_started_since(&self, team_id: &str, channel_id: &str, since: DateTime<Utc>) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM standups
                WHERE team_id = $1 AND channel_id = $2 AND started_at >= $3
            )
            ",
        )
        .bind(team_id)
        .bind(channel_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_terminal_before(&self, cutoff: DateTime<Utc>, limit: i64) -> RepoResult<Vec<StandupId>> {
        let rows = sqlx::query_as::<_, IdRow>(
            r"
            SELECT id FROM standups
            WHERE status IN ('completed', 'cancelled', 'expired') AND started_at < $1
            ORDER BY started_at
            LIMIT $2
            ",
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|row| StandupId::from_uuid(row.id)).collect())
    }

    #[instrument(skip(self))]
    async fn find_stalled_analysis(&self, before: DateTime<Utc>) -> RepoResult<Vec<Standup>> {
        let results = sqlx::query_as::<_, StandupModel>(&format!(
            r"
            SELECT {STANDUP_COLUMNS} FROM standups
            WHERE status = 'analyzing' AND updated_at < $1
            ORDER BY updated_at
            "
        ))
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Standup::from).collect())
    }

    #[instrument(skip(self, standup), fields(standup_id = %standup.id))]
    async fn create(&self, standup: &Standup) -> RepoResult<()> {
        bind_standup(sqlx::query(INSERT_STANDUP), standup)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::StandupAlreadyActive))?;

        Ok(())
    }

    #[instrument(skip(self, standup), fields(standup_id = %standup.id, status = %standup.status))]
    async fn save(&self, standup: &Standup) -> RepoResult<bool> {
        let sql = format!(
            r"
            {INSERT_STANDUP}
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                questions = EXCLUDED.questions,
                expected_participants = EXCLUDED.expected_participants,
                actual_participants = EXCLUDED.actual_participants,
                response_deadline = EXCLUDED.response_deadline,
                completed_at = EXCLUDED.completed_at,
                message_ts = EXCLUDED.message_ts,
                thread_ts = EXCLUDED.thread_ts,
                summary_message_ts = EXCLUDED.summary_message_ts,
                cancelled_by = EXCLUDED.cancelled_by,
                cancel_reason = EXCLUDED.cancel_reason,
                stats = EXCLUDED.stats,
                reminders = EXCLUDED.reminders,
                next_reminder_at = EXCLUDED.next_reminder_at,
                away = EXCLUDED.away,
                summary = EXCLUDED.summary,
                updated_at = EXCLUDED.updated_at
            {SAVE_GUARD}
            "
        );
        let result = bind_standup(sqlx::query(&sql), standup)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::StandupAlreadyActive))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: StandupId,
        from: &[StandupStatus],
        to: StandupStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let from: Vec<&str> = from.iter().map(|s| s.as_str()).collect();
        let result = sqlx::query(
            r"
            UPDATE standups
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = ANY($2)
            ",
        )
        .bind(id.into_inner())
        .bind(from)
        .bind(to.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::StandupAlreadyActive))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: StandupId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM standups WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(standup_not_found(id));
        }

        Ok(())
    }
}
