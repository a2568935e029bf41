//! Team service
//!
//! Keeps the installation record, chiefly the bot's own user id, current.

use standup_core::Team;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Team service
pub struct TeamService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TeamService<'a> {
    /// Create a new TeamService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record the bot user for a workspace
    ///
    /// Returns `true` when the stored record changed.
    #[instrument(skip(self))]
    pub async fn ensure_bot_user(&self, team_id: &str, bot_user_id: &str) -> ServiceResult<bool> {
        let now = self.ctx.now();
        let team = match self.ctx.team_repo().find(team_id).await? {
            Some(team) if team.is_bot_user(bot_user_id) && team.is_active => return Ok(false),
            Some(mut team) => {
                team.bot_user_id = Some(bot_user_id.to_string());
                team.is_active = true;
                team.updated_at = now;
                team
            }
            None => Team::new(team_id, now).with_bot_user(bot_user_id),
        };

        self.ctx.team_repo().upsert(&team).await?;
        info!(team_id = %team_id, bot_user_id = %bot_user_id, "Team bot user recorded");
        Ok(true)
    }
}
