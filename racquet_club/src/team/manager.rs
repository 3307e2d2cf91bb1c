//! Team formation.

use super::models::{CreateTeamRequest, NewTeam, TeamId, TeamWithMembers};
use crate::auth::{AuthError, User, require_player};
use crate::db::{TeamRepository, UserRepository};
use crate::error::{ClassifiedError, ErrorKind};
use std::sync::Arc;
use thiserror::Error;

/// Longest accepted team name, in characters
pub const MAX_TEAM_NAME_LEN: usize = 255;

/// Team errors
#[derive(Debug, Error)]
pub enum TeamError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid team: {0}")]
    InvalidInput(String),

    #[error("Partner not found")]
    PartnerNotFound,

    #[error("Partner must be a player")]
    PartnerNotPlayer,

    #[error("Team not found")]
    NotFound,
}

impl ClassifiedError for TeamError {
    fn kind(&self) -> ErrorKind {
        match self {
            TeamError::Database(_) => ErrorKind::Internal,
            TeamError::Auth(inner) => inner.kind(),
            TeamError::InvalidInput(_) | TeamError::PartnerNotPlayer => ErrorKind::InvalidInput,
            TeamError::PartnerNotFound | TeamError::NotFound => ErrorKind::NotFound,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            TeamError::Database(_) => "database_error",
            TeamError::Auth(inner) => inner.code(),
            TeamError::InvalidInput(_) => "invalid_input",
            TeamError::PartnerNotFound => "partner_not_found",
            TeamError::PartnerNotPlayer => "partner_not_player",
            TeamError::NotFound => "team_not_found",
        }
    }

    fn client_message(&self) -> String {
        match self {
            TeamError::Database(_) => "Internal server error".to_string(),
            TeamError::Auth(inner) => inner.client_message(),
            _ => self.to_string(),
        }
    }
}

pub type TeamResult<T> = Result<T, TeamError>;

/// Team manager
#[derive(Clone)]
pub struct TeamManager {
    teams: Arc<dyn TeamRepository>,
    users: Arc<dyn UserRepository>,
}

impl TeamManager {
    pub fn new(teams: Arc<dyn TeamRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { teams, users }
    }

    /// Pair the caller (captain) with a partner (player) in a new team
    pub async fn create_team(
        &self,
        caller: &User,
        request: CreateTeamRequest,
    ) -> TeamResult<TeamWithMembers> {
        require_player(caller)?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(TeamError::InvalidInput("name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_TEAM_NAME_LEN {
            return Err(TeamError::InvalidInput(format!(
                "name cannot exceed {MAX_TEAM_NAME_LEN} characters"
            )));
        }
        if request.partner_id == caller.id {
            return Err(TeamError::InvalidInput(
                "partner must be a different player".to_string(),
            ));
        }

        let partner = self
            .users
            .find_by_id(request.partner_id)
            .await
            .map_err(|e| match e {
                AuthError::Database(db) => TeamError::Database(db),
                other => TeamError::Auth(other),
            })?
            .ok_or(TeamError::PartnerNotFound)?;
        if !partner.is_player() {
            return Err(TeamError::PartnerNotPlayer);
        }

        let team = self
            .teams
            .create_team_with_members(NewTeam {
                name,
                description: request.description.trim().to_string(),
                captain_id: caller.id,
                partner_id: partner.id,
            })
            .await?;
        log::info!(
            "Player {} formed team {} '{}' with player {}",
            caller.id,
            team.team.id,
            team.team.name,
            partner.id
        );
        Ok(team)
    }

    pub async fn get_team(&self, team_id: TeamId) -> TeamResult<TeamWithMembers> {
        self.teams
            .find_team(team_id)
            .await?
            .ok_or(TeamError::NotFound)
    }
}
