//! PostgreSQL implementation of ChannelRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use standup_core::entities::Channel;
use standup_core::error::DomainError;
use standup_core::traits::{ChannelRepository, RepoResult};

use crate::mappers::ChannelValues;
use crate::models::ChannelModel;

use super::error::{channel_not_found, map_db_error, map_unique_violation};

const CHANNEL_COLUMNS: &str = r"
    team_id, channel_id, channel_name, configured_by, questions, schedule_time,
    schedule_days, timezone, participants, response_timeout_minutes,
    reminder_interval_minutes, enable_reminders, status, is_active, total_standups,
    last_standup_at, avg_response_rate, avg_response_time_ms, disabled_at,
    disabled_reason, auto_disabled, created_at, updated_at
";

/// PostgreSQL implementation of ChannelRepository
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_channels(models: Vec<ChannelModel>) -> RepoResult<Vec<Channel>> {
    models.into_iter().map(Channel::try_from).collect()
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self))]
    async fn find(&self, team_id: &str, channel_id: &str) -> RepoResult<Option<Channel>> {
        let result = sqlx::query_as::<_, ChannelModel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels WHERE team_id = $1 AND channel_id = $2"
        ))
        .bind(team_id)
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Channel::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_team(&self, team_id: &str) -> RepoResult<Vec<Channel>> {
        let results = sqlx::query_as::<_, ChannelModel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels WHERE team_id = $1 ORDER BY created_at"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_channels(results)
    }

    #[instrument(skip(self))]
    async fn find_scheduled_on(&self, weekdays: &[u8]) -> RepoResult<Vec<Channel>> {
        let days: Vec<i16> = weekdays.iter().map(|&d| i16::from(d)).collect();
        let results = sqlx::query_as::<_, ChannelModel>(&format!(
            r"
            SELECT {CHANNEL_COLUMNS} FROM channels
            WHERE is_active AND status = 'active' AND schedule_days && $1::SMALLINT[]
            "
        ))
        .bind(days)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_channels(results)
    }

    #[instrument(skip(self, channel), fields(team_id = %channel.team_id, channel_id = %channel.channel_id))]
    async fn create(&self, channel: &Channel) -> RepoResult<()> {
        let values = ChannelValues::new(channel);
        sqlx::query(
            r"
            INSERT INTO channels (
                team_id, channel_id, channel_name, configured_by, questions, schedule_time,
                schedule_days, timezone, participants, response_timeout_minutes,
                reminder_interval_minutes, enable_reminders, status, is_active, total_standups,
                last_standup_at, avg_response_rate, avg_response_time_ms, disabled_at,
                disabled_reason, auto_disabled, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23)
            ",
        )
        .bind(&channel.team_id)
        .bind(&channel.channel_id)
        .bind(&channel.channel_name)
        .bind(&channel.configured_by)
        .bind(&channel.config.questions)
        .bind(&values.schedule_time)
        .bind(&values.schedule_days)
        .bind(values.timezone)
        .bind(&channel.config.participants)
        .bind(values.response_timeout_minutes)
        .bind(values.reminder_interval_minutes)
        .bind(channel.config.enable_reminders)
        .bind(values.status)
        .bind(channel.is_active)
        .bind(values.total_standups)
        .bind(channel.stats.last_standup_at)
        .bind(channel.stats.avg_response_rate)
        .bind(channel.stats.avg_response_time_ms)
        .bind(channel.disabled_at)
        .bind(&channel.disabled_reason)
        .bind(channel.auto_disabled)
        .bind(channel.created_at)
        .bind(channel.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ChannelAlreadyConfigured))?;

        Ok(())
    }

    #[instrument(skip(self, channel), fields(team_id = %channel.team_id, channel_id = %channel.channel_id))]
    async fn update(&self, channel: &Channel) -> RepoResult<()> {
        let values = ChannelValues::new(channel);
        let result = sqlx::query(
            r"
            UPDATE channels
            SET channel_name = $3, configured_by = $4, questions = $5, schedule_time = $6,
                schedule_days = $7, timezone = $8, participants = $9,
                response_timeout_minutes = $10, reminder_interval_minutes = $11,
                enable_reminders = $12, status = $13, is_active = $14, total_standups = $15,
                last_standup_at = $16, avg_response_rate = $17, avg_response_time_ms = $18,
                disabled_at = $19, disabled_reason = $20, auto_disabled = $21, updated_at = $22
            WHERE team_id = $1 AND channel_id = $2
            ",
        )
        .bind(&channel.team_id)
        .bind(&channel.channel_id)
        .bind(&channel.channel_name)
        .bind(&channel.configured_by)
        .bind(&channel.config.questions)
        .bind(&values.schedule_time)
        .bind(&values.schedule_days)
        .bind(values.timezone)
        .bind(&channel.config.participants)
        .bind(values.response_timeout_minutes)
        .bind(values.reminder_interval_minutes)
        .bind(channel.config.enable_reminders)
        .bind(values.status)
        .bind(channel.is_active)
        .bind(values.total_standups)
        .bind(channel.stats.last_standup_at)
        .bind(channel.stats.avg_response_rate)
        .bind(channel.stats.avg_response_time_ms)
        .bind(channel.disabled_at)
        .bind(&channel.disabled_reason)
        .bind(channel.auto_disabled)
        .bind(channel.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(channel_not_found(&channel.team_id, &channel.channel_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, team_id: &str, channel_id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM channels WHERE team_id = $1 AND channel_id = $2")
            .bind(team_id)
            .bind(channel_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(channel_not_found(team_id, channel_id));
        }

        Ok(())
    }
}
