//! Team entity <-> model mapper

use standup_core::entities::Team;

use crate::models::TeamModel;

/// Convert TeamModel to Team entity
impl From<TeamModel> for Team {
    fn from(model: TeamModel) -> Self {
        Team {
            team_id: model.team_id,
            team_name: model.team_name,
            bot_user_id: model.bot_user_id,
            is_active: model.is_active,
            installed_at: model.installed_at,
            updated_at: model.updated_at,
        }
    }
}
