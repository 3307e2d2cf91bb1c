//! Tournament registry: CRUD and derived capacity information.

use super::models::{NewTournament, Tournament, TournamentId, TournamentInfo, TournamentUpdate};
use crate::auth::{AuthError, User, require_admin};
use crate::db::TournamentRepository;
use crate::error::{ClassifiedError, ErrorKind};
use std::sync::Arc;
use thiserror::Error;

/// Longest accepted tournament name, in characters
pub const MAX_NAME_LEN: usize = 255;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Invalid tournament: {0}")]
    InvalidInput(String),
}

impl ClassifiedError for TournamentError {
    fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::Database(_) => ErrorKind::Internal,
            TournamentError::Auth(inner) => inner.kind(),
            TournamentError::NotFound(_) => ErrorKind::NotFound,
            TournamentError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            TournamentError::Database(_) => "database_error",
            TournamentError::Auth(inner) => inner.code(),
            TournamentError::NotFound(_) => "tournament_not_found",
            TournamentError::InvalidInput(_) => "invalid_input",
        }
    }

    fn client_message(&self) -> String {
        match self {
            TournamentError::Database(_) => "Internal server error".to_string(),
            TournamentError::Auth(inner) => inner.client_message(),
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            TournamentError::InvalidInput(_) => self.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    tournaments: Arc<dyn TournamentRepository>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(tournaments: Arc<dyn TournamentRepository>) -> Self {
        Self { tournaments }
    }

    /// Create a tournament owned by the calling admin
    pub async fn create_tournament(
        &self,
        caller: &User,
        mut request: NewTournament,
    ) -> TournamentResult<TournamentInfo> {
        require_admin(caller)?;

        request.name = request.name.trim().to_string();
        validate_name(&request.name)?;
        validate_capacity("max_players", request.max_players)?;
        validate_capacity("max_teams", request.max_teams)?;
        validate_fees(request.entry_fee, request.prize_pool)?;

        let tournament = self.tournaments.create_tournament(caller.id, request).await?;
        log::info!(
            "Admin {} created {} tournament {} '{}'",
            caller.id,
            tournament.tournament_type,
            tournament.id,
            tournament.name
        );
        Ok(TournamentInfo::new(tournament, Default::default()))
    }

    /// Load a tournament or fail with `NotFound`
    pub async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.tournaments
            .find_tournament(id)
            .await?
            .ok_or(TournamentError::NotFound(id))
    }

    /// Tournament with capacity and active registration counts
    pub async fn get_tournament_info(&self, id: TournamentId) -> TournamentResult<TournamentInfo> {
        let tournament = self.get_tournament(id).await?;
        let counts = self.tournaments.count_registrations(id).await?;
        Ok(TournamentInfo::new(tournament, counts))
    }

    /// All tournaments, newest first
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentInfo>> {
        let tournaments = self.tournaments.list_tournaments().await?;
        let mut infos = Vec::with_capacity(tournaments.len());
        for tournament in tournaments {
            let counts = self.tournaments.count_registrations(tournament.id).await?;
            infos.push(TournamentInfo::new(tournament, counts));
        }
        Ok(infos)
    }

    /// Apply a partial update.
    ///
    /// Status may move between any two values; lowering a capacity below
    /// the current number of registrations only blocks new admissions.
    pub async fn update_tournament(
        &self,
        caller: &User,
        id: TournamentId,
        update: TournamentUpdate,
    ) -> TournamentResult<TournamentInfo> {
        require_admin(caller)?;

        if let Some(name) = &update.name {
            validate_name(name.trim())?;
        }
        if let Some(max_players) = update.max_players {
            validate_capacity("max_players", max_players)?;
        }
        if let Some(max_teams) = update.max_teams {
            validate_capacity("max_teams", max_teams)?;
        }
        validate_fees(
            update.entry_fee.unwrap_or_default(),
            update.prize_pool.unwrap_or_default(),
        )?;

        let mut tournament = self.get_tournament(id).await?;
        let previous_status = tournament.status;
        tournament.apply(TournamentUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            ..update
        });

        let tournament = self.tournaments.save_tournament(&tournament).await?;
        if tournament.status != previous_status {
            log::info!(
                "Tournament {} status {} -> {}",
                tournament.id,
                previous_status,
                tournament.status
            );
        }

        let counts = self.tournaments.count_registrations(id).await?;
        Ok(TournamentInfo::new(tournament, counts))
    }

    /// Hard delete; registrations go with it, matches lose the reference
    pub async fn delete_tournament(&self, caller: &User, id: TournamentId) -> TournamentResult<()> {
        require_admin(caller)?;
        if !self.tournaments.delete_tournament(id).await? {
            return Err(TournamentError::NotFound(id));
        }
        log::info!("Admin {} deleted tournament {}", caller.id, id);
        Ok(())
    }
}

fn validate_name(name: &str) -> TournamentResult<()> {
    if name.trim().is_empty() {
        return Err(TournamentError::InvalidInput(
            "name cannot be empty".to_string(),
        ));
    }
    if name.trim().chars().count() > MAX_NAME_LEN {
        return Err(TournamentError::InvalidInput(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_capacity(field: &str, value: i32) -> TournamentResult<()> {
    if value < 1 {
        return Err(TournamentError::InvalidInput(format!(
            "{field} must be at least 1"
        )));
    }
    Ok(())
}

fn validate_fees(entry_fee: f64, prize_pool: f64) -> TournamentResult<()> {
    if !(entry_fee.is_finite() && prize_pool.is_finite()) || entry_fee < 0.0 || prize_pool < 0.0 {
        return Err(TournamentError::InvalidInput(
            "entry_fee and prize_pool must be non-negative".to_string(),
        ));
    }
    Ok(())
}
