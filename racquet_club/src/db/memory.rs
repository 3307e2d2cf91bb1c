//! In-process implementation of the repository traits.
//!
//! All tables live behind one async mutex. Every operation holds the lock
//! from its first read to its last write, which gives the same
//! check-then-insert atomicity the PostgreSQL store gets from row locks.
//! Foreign-key behavior (cascades, `SET NULL`, restrict) is reproduced by
//! hand.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::repository::{
    MatchRepository, RegistrationRepository, StoreHealth, TeamRepository, TournamentRepository,
    UserRepository,
};
use crate::auth::{AuthError, AuthResult, NewUser, Role, User, UserId, UserRecord};
use crate::matches::{Match, MatchError, MatchId, MatchResult, NewMatch};
use crate::registration::rules::{self, PlayerAdmission, TeamAdmission};
use crate::registration::{
    PlayerRegistration, PlayerRegistrationDetail, RegistrationError, RegistrationResult,
    RegistrationStatus, TeamRegistration, TournamentRegistrations,
};
use crate::team::{
    MemberRole, NewTeam, Team, TeamId, TeamMember, TeamResult, TeamWithMembers,
};
use crate::tournament::{
    NewTournament, RegistrationCounts, Tournament, TournamentError, TournamentId,
    TournamentResult,
};

#[derive(Default)]
struct Sequences {
    users: i64,
    tournaments: i64,
    teams: i64,
    player_registrations: i64,
    team_registrations: i64,
    matches: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<UserId, UserRecord>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    teams: BTreeMap<TeamId, Team>,
    members: Vec<TeamMember>,
    player_registrations: Vec<PlayerRegistration>,
    team_registrations: Vec<TeamRegistration>,
    matches: BTreeMap<MatchId, Match>,
}

impl Tables {
    fn username_taken(&self, username: &str) -> bool {
        self.users.values().any(|r| r.user.username == username)
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|r| r.user.email == email && Some(r.user.id) != except)
    }

    fn active_players(&self, tournament_id: TournamentId) -> impl Iterator<Item = &PlayerRegistration> {
        self.player_registrations
            .iter()
            .filter(move |r| r.tournament_id == tournament_id && r.status.is_active())
    }

    fn active_teams(&self, tournament_id: TournamentId) -> impl Iterator<Item = &TeamRegistration> {
        self.team_registrations
            .iter()
            .filter(move |r| r.tournament_id == tournament_id && r.status.is_active())
    }

    fn is_member(&self, team_id: TeamId, player_id: UserId) -> bool {
        self.members
            .iter()
            .any(|m| m.team_id == team_id && m.player_id == player_id)
    }

    fn team_with_members(&self, team_id: TeamId) -> Option<TeamWithMembers> {
        let team = self.teams.get(&team_id)?.clone();
        let mut members: Vec<TeamMember> = self
            .members
            .iter()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| (m.role != MemberRole::Captain, m.joined_at, m.player_id));
        Some(TeamWithMembers { team, members })
    }

    /// Rejects a match row whose references name missing rows
    fn check_match_references(&self, game: &Match) -> MatchResult<()> {
        if let Some(id) = game.tournament_id.filter(|id| !self.tournaments.contains_key(id)) {
            return Err(MatchError::InvalidInput(format!("tournament {id} does not exist")));
        }
        for id in [game.player1_id, game.player2_id, game.winner_player_id]
            .into_iter()
            .flatten()
        {
            if !self.users.contains_key(&id) {
                return Err(MatchError::InvalidInput(format!("player {id} does not exist")));
            }
        }
        for id in [game.team1_id, game.team2_id, game.winner_team_id]
            .into_iter()
            .flatten()
        {
            if !self.teams.contains_key(&id) {
                return Err(MatchError::InvalidInput(format!("team {id} does not exist")));
            }
        }
        Ok(())
    }

    /// Cascades and nulls the references a deleted user leaves behind
    fn detach_user(&mut self, user_id: UserId) {
        self.members.retain(|m| m.player_id != user_id);
        self.player_registrations.retain(|r| r.player_id != user_id);
        for game in self.matches.values_mut() {
            for slot in [
                &mut game.player1_id,
                &mut game.player2_id,
                &mut game.winner_player_id,
            ] {
                if *slot == Some(user_id) {
                    *slot = None;
                }
            }
        }
    }
}

/// Store that keeps everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> AuthResult<User> {
        let mut tables = self.tables.lock().await;
        if tables.username_taken(&new_user.username) {
            return Err(AuthError::UsernameTaken);
        }
        if tables.email_taken(&new_user.email, None) {
            return Err(AuthError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: next(&mut tables.seq.users),
            username: new_user.username,
            email: new_user.email,
            full_name: new_user.full_name,
            role: new_user.role,
            is_active: true,
            ranking: new_user.ranking,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&user_id).map(|r| r.user.clone()))
    }

    async fn find_by_login(&self, login: &str) -> AuthResult<Option<UserRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|r| r.user.username == login || r.user.email == login)
            .cloned())
    }

    async fn find_record(&self, user_id: UserId) -> AuthResult<Option<UserRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn list_users(&self, role: Option<Role>) -> AuthResult<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .filter(|r| role.is_none_or(|role| r.user.role == role))
            .map(|r| r.user.clone())
            .collect())
    }

    async fn save_user(&self, user: &User) -> AuthResult<User> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user.id) {
            return Err(AuthError::UserNotFound);
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(AuthError::EmailTaken);
        }

        let record = tables
            .users
            .get_mut(&user.id)
            .ok_or(AuthError::UserNotFound)?;
        // Username and creation time are immutable
        record.user.email = user.email.clone();
        record.user.full_name = user.full_name.clone();
        record.user.role = user.role;
        record.user.is_active = user.is_active;
        record.user.ranking = user.ranking;
        record.user.updated_at = Utc::now();
        Ok(record.user.clone())
    }

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> AuthResult<()> {
        let mut tables = self.tables.lock().await;
        let record = tables
            .users
            .get_mut(&user_id)
            .ok_or(AuthError::UserNotFound)?;
        record.password_hash = password_hash.to_string();
        record.user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId, role: Option<Role>) -> AuthResult<bool> {
        let mut tables = self.tables.lock().await;
        let matches_role = tables
            .users
            .get(&user_id)
            .is_some_and(|r| role.is_none_or(|role| r.user.role == role));
        if !matches_role {
            return Ok(false);
        }
        if tables.tournaments.values().any(|t| t.admin_id == user_id) {
            return Err(AuthError::UserInUse);
        }

        tables.users.remove(&user_id);
        tables.detach_user(user_id);
        Ok(true)
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn create_tournament(
        &self,
        admin_id: UserId,
        request: NewTournament,
    ) -> TournamentResult<Tournament> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let tournament = Tournament {
            id: next(&mut tables.seq.tournaments),
            name: request.name,
            description: request.description,
            tournament_type: request.tournament_type,
            status: request.status,
            start_date: request.start_date,
            end_date: request.end_date,
            max_players: request.max_players,
            max_teams: request.max_teams,
            entry_fee: request.entry_fee,
            prize_pool: request.prize_pool,
            admin_id,
            created_at: now,
            updated_at: now,
        };
        tables.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn find_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        let tables = self.tables.lock().await;
        Ok(tables.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let tables = self.tables.lock().await;
        let mut tournaments: Vec<Tournament> = tables.tournaments.values().cloned().collect();
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tournaments)
    }

    async fn save_tournament(&self, tournament: &Tournament) -> TournamentResult<Tournament> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .tournaments
            .get_mut(&tournament.id)
            .ok_or(TournamentError::NotFound(tournament.id))?;

        let admin_id = stored.admin_id;
        let created_at = stored.created_at;
        *stored = Tournament {
            admin_id,
            created_at,
            updated_at: Utc::now(),
            ..tournament.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_tournament(&self, id: TournamentId) -> TournamentResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.tournaments.remove(&id).is_none() {
            return Ok(false);
        }

        tables.player_registrations.retain(|r| r.tournament_id != id);
        tables.team_registrations.retain(|r| r.tournament_id != id);
        for game in tables.matches.values_mut() {
            if game.tournament_id == Some(id) {
                game.tournament_id = None;
            }
        }
        Ok(true)
    }

    async fn count_registrations(&self, id: TournamentId) -> TournamentResult<RegistrationCounts> {
        let tables = self.tables.lock().await;
        Ok(RegistrationCounts {
            players: tables.active_players(id).count() as i64,
            teams: tables.active_teams(id).count() as i64,
        })
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn admit_player(
        &self,
        tournament_id: TournamentId,
        player_id: UserId,
    ) -> RegistrationResult<PlayerRegistration> {
        let mut tables = self.tables.lock().await;
        let tournament = tables
            .tournaments
            .get(&tournament_id)
            .ok_or(RegistrationError::TournamentNotFound)?;

        rules::check_player_admission(&PlayerAdmission {
            tournament,
            active_count: tables.active_players(tournament_id).count() as i64,
            already_registered: tables
                .active_players(tournament_id)
                .any(|r| r.player_id == player_id),
        })?;

        let registration = PlayerRegistration {
            id: next(&mut tables.seq.player_registrations),
            tournament_id,
            player_id,
            status: RegistrationStatus::Registered,
            registered_at: Utc::now(),
        };
        tables.player_registrations.push(registration.clone());
        Ok(registration)
    }

    async fn withdraw_player(
        &self,
        tournament_id: TournamentId,
        player_id: UserId,
    ) -> RegistrationResult<PlayerRegistration> {
        let mut tables = self.tables.lock().await;
        let registration = tables
            .player_registrations
            .iter_mut()
            .find(|r| {
                r.tournament_id == tournament_id && r.player_id == player_id && r.status.is_active()
            })
            .ok_or(RegistrationError::RegistrationNotFound)?;

        registration.status = RegistrationStatus::Withdrawn;
        Ok(registration.clone())
    }

    async fn admit_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        caller_id: UserId,
    ) -> RegistrationResult<TeamRegistration> {
        let mut tables = self.tables.lock().await;
        let tournament = tables
            .tournaments
            .get(&tournament_id)
            .ok_or(RegistrationError::TournamentNotFound)?;

        rules::check_team_admission(&TeamAdmission {
            tournament,
            team_exists: tables.teams.contains_key(&team_id),
            caller_is_member: tables.is_member(team_id, caller_id),
            active_count: tables.active_teams(tournament_id).count() as i64,
            already_registered: tables
                .active_teams(tournament_id)
                .any(|r| r.team_id == team_id),
        })?;

        let registration = TeamRegistration {
            id: next(&mut tables.seq.team_registrations),
            tournament_id,
            team_id,
            status: RegistrationStatus::Registered,
            registered_at: Utc::now(),
        };
        tables.team_registrations.push(registration.clone());
        Ok(registration)
    }

    async fn withdraw_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        caller_id: UserId,
    ) -> RegistrationResult<TeamRegistration> {
        let mut tables = self.tables.lock().await;
        if !tables.teams.contains_key(&team_id) {
            return Err(RegistrationError::TeamNotFound);
        }
        if !tables.is_member(team_id, caller_id) {
            return Err(RegistrationError::NotTeamMember);
        }

        let registration = tables
            .team_registrations
            .iter_mut()
            .find(|r| r.tournament_id == tournament_id && r.team_id == team_id && r.status.is_active())
            .ok_or(RegistrationError::RegistrationNotFound)?;

        registration.status = RegistrationStatus::Withdrawn;
        Ok(registration.clone())
    }

    async fn active_registrations_for_player(
        &self,
        player_id: UserId,
    ) -> RegistrationResult<Vec<PlayerRegistrationDetail>> {
        let tables = self.tables.lock().await;
        let mut details: Vec<PlayerRegistrationDetail> = tables
            .player_registrations
            .iter()
            .filter(|r| r.player_id == player_id && r.status.is_active())
            .filter_map(|r| {
                tables
                    .tournaments
                    .get(&r.tournament_id)
                    .map(|t| PlayerRegistrationDetail {
                        registration: r.clone(),
                        tournament: t.clone(),
                    })
            })
            .collect();
        details.sort_by(|a, b| {
            b.registration
                .registered_at
                .cmp(&a.registration.registered_at)
                .then(b.registration.id.cmp(&a.registration.id))
        });
        Ok(details)
    }

    async fn active_registrations_for_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> RegistrationResult<TournamentRegistrations> {
        let tables = self.tables.lock().await;
        if !tables.tournaments.contains_key(&tournament_id) {
            return Err(RegistrationError::TournamentNotFound);
        }

        Ok(TournamentRegistrations {
            players: tables.active_players(tournament_id).cloned().collect(),
            teams: tables.active_teams(tournament_id).cloned().collect(),
        })
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn create_team_with_members(&self, new_team: NewTeam) -> TeamResult<TeamWithMembers> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let team = Team {
            id: next(&mut tables.seq.teams),
            name: new_team.name,
            description: new_team.description,
            created_at: now,
        };

        let members = vec![
            TeamMember {
                team_id: team.id,
                player_id: new_team.captain_id,
                role: MemberRole::Captain,
                joined_at: now,
            },
            TeamMember {
                team_id: team.id,
                player_id: new_team.partner_id,
                role: MemberRole::Player,
                joined_at: now,
            },
        ];

        tables.teams.insert(team.id, team.clone());
        tables.members.extend(members.iter().cloned());
        Ok(TeamWithMembers { team, members })
    }

    async fn find_team(&self, team_id: TeamId) -> TeamResult<Option<TeamWithMembers>> {
        let tables = self.tables.lock().await;
        Ok(tables.team_with_members(team_id))
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn create_match(&self, request: NewMatch) -> MatchResult<Match> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let game = Match {
            id: next(&mut tables.seq.matches),
            tournament_id: request.tournament_id,
            match_type: request.match_type,
            status: request.status,
            match_date: request.match_date.unwrap_or(now),
            round: request.round,
            player1_id: request.player1_id,
            player2_id: request.player2_id,
            player1_score: request.player1_score,
            player2_score: request.player2_score,
            team1_id: request.team1_id,
            team2_id: request.team2_id,
            team1_score: request.team1_score,
            team2_score: request.team2_score,
            winner_player_id: None,
            winner_team_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.check_match_references(&game)?;
        tables.matches.insert(game.id, game.clone());
        Ok(game)
    }

    async fn find_match(&self, id: MatchId) -> MatchResult<Option<Match>> {
        let tables = self.tables.lock().await;
        Ok(tables.matches.get(&id).cloned())
    }

    async fn list_matches(&self) -> MatchResult<Vec<Match>> {
        let tables = self.tables.lock().await;
        let mut matches: Vec<Match> = tables.matches.values().cloned().collect();
        matches.sort_by(|a, b| b.match_date.cmp(&a.match_date).then(b.id.cmp(&a.id)));
        Ok(matches)
    }

    async fn save_match(&self, game: &Match) -> MatchResult<Match> {
        let mut tables = self.tables.lock().await;
        if !tables.matches.contains_key(&game.id) {
            return Err(MatchError::NotFound(game.id));
        }
        tables.check_match_references(game)?;
        let stored = tables
            .matches
            .get_mut(&game.id)
            .ok_or(MatchError::NotFound(game.id))?;

        let created_at = stored.created_at;
        *stored = Match {
            created_at,
            updated_at: Utc::now(),
            ..game.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_match(&self, id: MatchId) -> MatchResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(tables.matches.remove(&id).is_some())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn health_check(&self) -> bool {
        true
    }
}
