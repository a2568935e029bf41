//! PostgreSQL implementation of TeamRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use standup_core::entities::Team;
use standup_core::traits::{RepoResult, TeamRepository};

use crate::models::TeamModel;

use super::error::map_db_error;

/// PostgreSQL implementation of TeamRepository
#[derive(Clone)]
pub struct PgTeamRepository {
    pool: PgPool,
}

impl PgTeamRepository {
    /// Create a new PgTeamRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PgTeamRepository {
    #[instrument(skip(self))]
    async fn find(&self, team_id: &str) -> RepoResult<Option<Team>> {
        let result = sqlx::query_as::<_, TeamModel>(
            r"
            SELECT team_id, team_name, bot_user_id, is_active, installed_at, updated_at
            FROM teams
            WHERE team_id = $1
            ",
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Team::from))
    }

    #[instrument(skip(self, team), fields(team_id = %team.team_id))]
    async fn upsert(&self, team: &Team) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO teams (team_id, team_name, bot_user_id, is_active, installed_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (team_id) DO UPDATE SET
                team_name = COALESCE(EXCLUDED.team_name, teams.team_name),
                bot_user_id = COALESCE(EXCLUDED.bot_user_id, teams.bot_user_id),
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(&team.team_id)
        .bind(&team.team_name)
        .bind(&team.bot_user_id)
        .bind(team.is_active)
        .bind(team.installed_at)
        .bind(team.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
