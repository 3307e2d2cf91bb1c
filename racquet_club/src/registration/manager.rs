//! Registration engine.

use super::errors::RegistrationResult;
use super::models::{
    PlayerRegistration, PlayerRegistrationDetail, TeamRegistration, TournamentRegistrations,
};
use crate::auth::{User, require_player};
use crate::db::RegistrationRepository;
use crate::team::TeamId;
use crate::tournament::TournamentId;
use std::sync::Arc;

/// Enrolls players and teams into tournaments
#[derive(Clone)]
pub struct RegistrationManager {
    registrations: Arc<dyn RegistrationRepository>,
}

impl RegistrationManager {
    pub fn new(registrations: Arc<dyn RegistrationRepository>) -> Self {
        Self { registrations }
    }

    /// Register the calling player.
    ///
    /// # Errors
    ///
    /// * `Auth(PlayerRequired)` - Caller is not a player
    /// * `TournamentNotFound`
    /// * `RegistrationClosed` - Status is not upcoming
    /// * `AlreadyRegistered` - Caller holds an active registration
    /// * `TournamentFull` - Active registrations reached capacity
    pub async fn register_player(
        &self,
        caller: &User,
        tournament_id: TournamentId,
    ) -> RegistrationResult<PlayerRegistration> {
        require_player(caller)?;

        let registration = self
            .registrations
            .admit_player(tournament_id, caller.id)
            .await?;
        log::info!(
            "Player {} registered for tournament {} (registration {})",
            caller.id,
            tournament_id,
            registration.id
        );
        Ok(registration)
    }

    /// Withdraw the caller's active registration, freeing the slot
    pub async fn unregister_player(
        &self,
        caller: &User,
        tournament_id: TournamentId,
    ) -> RegistrationResult<PlayerRegistration> {
        require_player(caller)?;

        let registration = self
            .registrations
            .withdraw_player(tournament_id, caller.id)
            .await?;
        log::info!("Player {} withdrew from tournament {}", caller.id, tournament_id);
        Ok(registration)
    }

    /// Register a team the caller belongs to.
    ///
    /// Membership gates this, not captaincy.
    pub async fn register_team(
        &self,
        caller: &User,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> RegistrationResult<TeamRegistration> {
        require_player(caller)?;

        let registration = self
            .registrations
            .admit_team(tournament_id, team_id, caller.id)
            .await?;
        log::info!(
            "Player {} registered team {} for tournament {}",
            caller.id,
            team_id,
            tournament_id
        );
        Ok(registration)
    }

    /// Withdraw a team's active registration; any member may do this
    pub async fn withdraw_team(
        &self,
        caller: &User,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> RegistrationResult<TeamRegistration> {
        require_player(caller)?;

        let registration = self
            .registrations
            .withdraw_team(tournament_id, team_id, caller.id)
            .await?;
        log::info!(
            "Player {} withdrew team {} from tournament {}",
            caller.id,
            team_id,
            tournament_id
        );
        Ok(registration)
    }

    /// The caller's active registrations with their tournaments
    pub async fn my_registrations(
        &self,
        caller: &User,
    ) -> RegistrationResult<Vec<PlayerRegistrationDetail>> {
        require_player(caller)?;
        self.registrations
            .active_registrations_for_player(caller.id)
            .await
    }

    pub async fn tournament_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> RegistrationResult<TournamentRegistrations> {
        self.registrations
            .active_registrations_for_tournament(tournament_id)
            .await
    }
}
