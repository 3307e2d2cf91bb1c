//! Repository trait definitions for testability and dependency injection.
//!
//! Managers hold these traits behind `Arc<dyn ...>`, so the same business
//! logic runs against PostgreSQL ([`super::PgStore`]) and the in-memory
//! store ([`super::MemoryStore`]).

use async_trait::async_trait;

use crate::auth::{AuthResult, NewUser, Role, User, UserId, UserRecord};
use crate::matches::{Match, MatchId, MatchResult, NewMatch};
use crate::registration::{
    PlayerRegistration, PlayerRegistrationDetail, RegistrationResult, TeamRegistration,
    TournamentRegistrations,
};
use crate::team::{NewTeam, TeamId, TeamResult, TeamWithMembers};
use crate::tournament::{
    NewTournament, RegistrationCounts, Tournament, TournamentId, TournamentResult,
};

/// User and credential storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; duplicate username or email map to the matching conflict
    async fn create_user(&self, user: NewUser) -> AuthResult<User>;

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Look up by username or email, including the password hash
    async fn find_by_login(&self, login: &str) -> AuthResult<Option<UserRecord>>;

    /// Password hash of an existing user
    async fn find_record(&self, user_id: UserId) -> AuthResult<Option<UserRecord>>;

    /// All users, optionally restricted to one role, ordered by id
    async fn list_users(&self, role: Option<Role>) -> AuthResult<Vec<User>>;

    /// Persist every mutable field of `user`
    async fn save_user(&self, user: &User) -> AuthResult<User>;

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> AuthResult<()>;

    /// Hard delete; with `role` set only a user holding that role is removed.
    /// Returns false when nothing matched.
    async fn delete_user(&self, user_id: UserId, role: Option<Role>) -> AuthResult<bool>;
}

/// Tournament storage
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn create_tournament(
        &self,
        admin_id: UserId,
        tournament: NewTournament,
    ) -> TournamentResult<Tournament>;

    async fn find_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>>;

    /// Newest first
    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>>;

    /// Persist every mutable field; `admin_id` is never rewritten
    async fn save_tournament(&self, tournament: &Tournament) -> TournamentResult<Tournament>;

    /// Hard delete; returns false when nothing matched
    async fn delete_tournament(&self, id: TournamentId) -> TournamentResult<bool>;

    /// Active player and team registrations
    async fn count_registrations(&self, id: TournamentId) -> TournamentResult<RegistrationCounts>;
}

/// Registration storage.
///
/// `admit_*` run the whole admission sequence atomically: read the
/// tournament, count active registrations, check for a duplicate, apply
/// [`crate::registration::rules`] and insert.
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn admit_player(
        &self,
        tournament_id: TournamentId,
        player_id: UserId,
    ) -> RegistrationResult<PlayerRegistration>;

    /// Mark the active registration withdrawn
    async fn withdraw_player(
        &self,
        tournament_id: TournamentId,
        player_id: UserId,
    ) -> RegistrationResult<PlayerRegistration>;

    async fn admit_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        caller_id: UserId,
    ) -> RegistrationResult<TeamRegistration>;

    async fn withdraw_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        caller_id: UserId,
    ) -> RegistrationResult<TeamRegistration>;

    async fn active_registrations_for_player(
        &self,
        player_id: UserId,
    ) -> RegistrationResult<Vec<PlayerRegistrationDetail>>;

    async fn active_registrations_for_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> RegistrationResult<TournamentRegistrations>;
}

/// Team storage
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Insert the team, the captain membership and the partner membership
    /// as one unit
    async fn create_team_with_members(&self, team: NewTeam) -> TeamResult<TeamWithMembers>;

    async fn find_team(&self, team_id: TeamId) -> TeamResult<Option<TeamWithMembers>>;
}

/// Match storage
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn create_match(&self, new_match: NewMatch) -> MatchResult<Match>;

    async fn find_match(&self, id: MatchId) -> MatchResult<Option<Match>>;

    /// Most recent `match_date` first
    async fn list_matches(&self) -> MatchResult<Vec<Match>>;

    async fn save_match(&self, game: &Match) -> MatchResult<Match>;

    /// Hard delete; returns false when nothing matched
    async fn delete_match(&self, id: MatchId) -> MatchResult<bool>;
}

/// Liveness check for the backing storage
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn health_check(&self) -> bool;
}

/// Everything the application needs from a store
pub trait Store:
    UserRepository
    + TournamentRepository
    + RegistrationRepository
    + TeamRepository
    + MatchRepository
    + StoreHealth
{
}

impl<T> Store for T where
    T: UserRepository
        + TournamentRepository
        + RegistrationRepository
        + TeamRepository
        + MatchRepository
        + StoreHealth
{
}
