//! PostgreSQL implementation of the repository traits.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use super::repository::{
    MatchRepository, RegistrationRepository, StoreHealth, TeamRepository, TournamentRepository,
    UserRepository,
};
use crate::auth::{AuthError, AuthResult, NewUser, Role, User, UserId, UserRecord};
use crate::error::ParseEnumError;
use crate::matches::{Match, MatchError, MatchId, MatchResult, NewMatch};
use crate::registration::rules::{self, PlayerAdmission, TeamAdmission};
use crate::registration::{
    PlayerRegistration, PlayerRegistrationDetail, RegistrationError, RegistrationResult,
    TeamRegistration, TournamentRegistrations,
};
use crate::team::{MemberRole, NewTeam, Team, TeamId, TeamMember, TeamResult, TeamWithMembers};
use crate::tournament::{
    NewTournament, RegistrationCounts, Tournament, TournamentError, TournamentId,
    TournamentResult,
};

/// Default upper bound for the health check query
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    health_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            health_timeout: HEALTH_CHECK_TIMEOUT,
        }
    }

    /// Override how long the health check may wait for the database
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Decode a text column into one of the domain enums
fn enum_column<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let text: String = row.try_get(column)?;
    text.parse().map_err(|err: ParseEnumError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        role: enum_column(row, "role")?,
        is_active: row.try_get("is_active")?,
        ranking: row.try_get("ranking")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn record_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        user: user_from_row(row)?,
        password_hash: row.try_get("password_hash")?,
    })
}

fn tournament_from_row(row: &PgRow) -> Result<Tournament, sqlx::Error> {
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        tournament_type: enum_column(row, "tournament_type")?,
        status: enum_column(row, "status")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        max_players: row.try_get("max_players")?,
        max_teams: row.try_get("max_teams")?,
        entry_fee: row.try_get("entry_fee")?,
        prize_pool: row.try_get("prize_pool")?,
        admin_id: row.try_get("admin_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn player_registration_from_row(row: &PgRow) -> Result<PlayerRegistration, sqlx::Error> {
    Ok(PlayerRegistration {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        player_id: row.try_get("player_id")?,
        status: enum_column(row, "status")?,
        registered_at: row.try_get("registered_at")?,
    })
}

fn team_registration_from_row(row: &PgRow) -> Result<TeamRegistration, sqlx::Error> {
    Ok(TeamRegistration {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        team_id: row.try_get("team_id")?,
        status: enum_column(row, "status")?,
        registered_at: row.try_get("registered_at")?,
    })
}

fn team_from_row(row: &PgRow) -> Result<Team, sqlx::Error> {
    Ok(Team {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn member_from_row(row: &PgRow) -> Result<TeamMember, sqlx::Error> {
    Ok(TeamMember {
        team_id: row.try_get("team_id")?,
        player_id: row.try_get("player_id")?,
        role: enum_column(row, "role")?,
        joined_at: row.try_get("joined_at")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, sqlx::Error> {
    Ok(Match {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        match_type: enum_column(row, "match_type")?,
        status: enum_column(row, "status")?,
        match_date: row.try_get("match_date")?,
        round: row.try_get("round")?,
        player1_id: row.try_get("player1_id")?,
        player2_id: row.try_get("player2_id")?,
        player1_score: row.try_get("player1_score")?,
        player2_score: row.try_get("player2_score")?,
        team1_id: row.try_get("team1_id")?,
        team2_id: row.try_get("team2_id")?,
        team1_score: row.try_get("team1_score")?,
        team2_score: row.try_get("team2_score")?,
        winner_player_id: row.try_get("winner_player_id")?,
        winner_team_id: row.try_get("winner_team_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Map constraint violations on `users` to account conflicts
fn user_write_error(err: sqlx::Error) -> AuthError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AuthError::EmailTaken,
                _ => AuthError::UsernameTaken,
            };
        }
        if db_err.is_foreign_key_violation() {
            return AuthError::UserInUse;
        }
    }
    AuthError::Database(err)
}

/// A foreign-key violation means the match names a row that does not exist
fn match_write_error(err: sqlx::Error) -> MatchError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_foreign_key_violation() => MatchError::InvalidInput(format!(
            "referenced row does not exist ({})",
            db_err.constraint().unwrap_or("unknown constraint")
        )),
        _ => MatchError::Database(err),
    }
}

/// A unique violation on insert means a concurrent duplicate slipped past the check
fn registration_insert_error(err: sqlx::Error, duplicate: RegistrationError) -> RegistrationError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => duplicate,
        _ => RegistrationError::Database(err),
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> AuthResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, role, ranking)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.ranking)
        .fetch_one(&self.pool)
        .await
        .map_err(user_write_error)?;

        Ok(user_from_row(&row)?)
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_by_login(&self, login: &str) -> AuthResult<Option<UserRecord>> {
        // Usernames cannot contain '@', so at most one row matches
        let row = sqlx::query("SELECT * FROM users WHERE username = $1 OR email = $1 LIMIT 1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(record_from_row).transpose()?)
    }

    async fn find_record(&self, user_id: UserId) -> AuthResult<Option<UserRecord>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(record_from_row).transpose()?)
    }

    async fn list_users(&self, role: Option<Role>) -> AuthResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE ($1::TEXT IS NULL OR role = $1) ORDER BY id")
            .bind(role.map(|r| r.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(user_from_row).collect::<Result<_, _>>()?)
    }

    async fn save_user(&self, user: &User) -> AuthResult<User> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, full_name = $3, role = $4, is_active = $5, ranking = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.ranking)
        .fetch_optional(&self.pool)
        .await
        .map_err(user_write_error)?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user_from_row(&row)?)
    }

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> AuthResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId, role: Option<Role>) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND ($2::TEXT IS NULL OR role = $2)")
            .bind(user_id)
            .bind(role.map(|r| r.as_str()))
            .execute(&self.pool)
            .await
            .map_err(user_write_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn create_tournament(
        &self,
        admin_id: UserId,
        tournament: NewTournament,
    ) -> TournamentResult<Tournament> {
        let row = sqlx::query(
            r#"
            INSERT INTO tournaments (name, description, tournament_type, status, start_date,
                                     end_date, max_players, max_teams, entry_fee, prize_pool,
                                     admin_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&tournament.name)
        .bind(&tournament.description)
        .bind(tournament.tournament_type.as_str())
        .bind(tournament.status.as_str())
        .bind(tournament.start_date)
        .bind(tournament.end_date)
        .bind(tournament.max_players)
        .bind(tournament.max_teams)
        .bind(tournament.entry_fee)
        .bind(tournament.prize_pool)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(tournament_from_row(&row)?)
    }

    async fn find_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        let row = sqlx::query("SELECT * FROM tournaments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(tournament_from_row).transpose()?)
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let rows = sqlx::query("SELECT * FROM tournaments ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(tournament_from_row).collect::<Result<_, _>>()?)
    }

    async fn save_tournament(&self, tournament: &Tournament) -> TournamentResult<Tournament> {
        let row = sqlx::query(
            r#"
            UPDATE tournaments
            SET name = $2, description = $3, tournament_type = $4, status = $5,
                start_date = $6, end_date = $7, max_players = $8, max_teams = $9,
                entry_fee = $10, prize_pool = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tournament.id)
        .bind(&tournament.name)
        .bind(&tournament.description)
        .bind(tournament.tournament_type.as_str())
        .bind(tournament.status.as_str())
        .bind(tournament.start_date)
        .bind(tournament.end_date)
        .bind(tournament.max_players)
        .bind(tournament.max_teams)
        .bind(tournament.entry_fee)
        .bind(tournament.prize_pool)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TournamentError::NotFound(tournament.id))?;

        Ok(tournament_from_row(&row)?)
    }

    async fn delete_tournament(&self, id: TournamentId) -> TournamentResult<bool> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_registrations(&self, id: TournamentId) -> TournamentResult<RegistrationCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM tournament_players
                 WHERE tournament_id = $1 AND status <> 'withdrawn') AS players,
                (SELECT COUNT(*) FROM tournament_teams
                 WHERE tournament_id = $1 AND status <> 'withdrawn') AS teams
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(RegistrationCounts {
            players: row.try_get("players")?,
            teams: row.try_get("teams")?,
        })
    }
}

#[async_trait]
impl RegistrationRepository for PgStore {
    async fn admit_player(
        &self,
        tournament_id: TournamentId,
        player_id: UserId,
    ) -> RegistrationResult<PlayerRegistration> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent admissions to the same tournament
        let row = sqlx::query("SELECT * FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RegistrationError::TournamentNotFound)?;
        let tournament = tournament_from_row(&row)?;

        let snapshot = sqlx::query(
            r#"
            SELECT COUNT(*) AS active,
                   COALESCE(BOOL_OR(player_id = $2), FALSE) AS already_registered
            FROM tournament_players
            WHERE tournament_id = $1 AND status <> 'withdrawn'
            "#,
        )
        .bind(tournament_id)
        .bind(player_id)
        .fetch_one(&mut *tx)
        .await?;

        rules::check_player_admission(&PlayerAdmission {
            tournament: &tournament,
            active_count: snapshot.try_get("active")?,
            already_registered: snapshot.try_get("already_registered")?,
        })?;

        let row = sqlx::query(
            r#"
            INSERT INTO tournament_players (tournament_id, player_id, status)
            VALUES ($1, $2, 'registered')
            RETURNING *
            "#,
        )
        .bind(tournament_id)
        .bind(player_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| registration_insert_error(e, RegistrationError::AlreadyRegistered))?;
        let registration = player_registration_from_row(&row)?;

        tx.commit().await?;
        Ok(registration)
    }

    async fn withdraw_player(
        &self,
        tournament_id: TournamentId,
        player_id: UserId,
    ) -> RegistrationResult<PlayerRegistration> {
        let row = sqlx::query(
            r#"
            UPDATE tournament_players
            SET status = 'withdrawn'
            WHERE tournament_id = $1 AND player_id = $2 AND status <> 'withdrawn'
            RETURNING *
            "#,
        )
        .bind(tournament_id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RegistrationError::RegistrationNotFound)?;

        Ok(player_registration_from_row(&row)?)
    }

    async fn admit_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        caller_id: UserId,
    ) -> RegistrationResult<TeamRegistration> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RegistrationError::TournamentNotFound)?;
        let tournament = tournament_from_row(&row)?;

        let snapshot = sqlx::query(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM teams WHERE id = $2) AS team_exists,
                EXISTS (SELECT 1 FROM team_members
                        WHERE team_id = $2 AND player_id = $3) AS caller_is_member,
                (SELECT COUNT(*) FROM tournament_teams
                 WHERE tournament_id = $1 AND status <> 'withdrawn') AS active,
                EXISTS (SELECT 1 FROM tournament_teams
                        WHERE tournament_id = $1 AND team_id = $2
                          AND status <> 'withdrawn') AS already_registered
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .bind(caller_id)
        .fetch_one(&mut *tx)
        .await?;

        rules::check_team_admission(&TeamAdmission {
            tournament: &tournament,
            team_exists: snapshot.try_get("team_exists")?,
            caller_is_member: snapshot.try_get("caller_is_member")?,
            active_count: snapshot.try_get("active")?,
            already_registered: snapshot.try_get("already_registered")?,
        })?;

        let row = sqlx::query(
            r#"
            INSERT INTO tournament_teams (tournament_id, team_id, status)
            VALUES ($1, $2, 'registered')
            RETURNING *
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| registration_insert_error(e, RegistrationError::TeamAlreadyRegistered))?;
        let registration = team_registration_from_row(&row)?;

        tx.commit().await?;
        Ok(registration)
    }

    async fn withdraw_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        caller_id: UserId,
    ) -> RegistrationResult<TeamRegistration> {
        let mut tx = self.pool.begin().await?;

        let membership = sqlx::query(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM teams WHERE id = $1) AS team_exists,
                EXISTS (SELECT 1 FROM team_members
                        WHERE team_id = $1 AND player_id = $2) AS caller_is_member
            "#,
        )
        .bind(team_id)
        .bind(caller_id)
        .fetch_one(&mut *tx)
        .await?;

        if !membership.try_get::<bool, _>("team_exists")? {
            return Err(RegistrationError::TeamNotFound);
        }
        if !membership.try_get::<bool, _>("caller_is_member")? {
            return Err(RegistrationError::NotTeamMember);
        }

        let row = sqlx::query(
            r#"
            UPDATE tournament_teams
            SET status = 'withdrawn'
            WHERE tournament_id = $1 AND team_id = $2 AND status <> 'withdrawn'
            RETURNING *
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RegistrationError::RegistrationNotFound)?;
        let registration = team_registration_from_row(&row)?;

        tx.commit().await?;
        Ok(registration)
    }

    async fn active_registrations_for_player(
        &self,
        player_id: UserId,
    ) -> RegistrationResult<Vec<PlayerRegistrationDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM tournament_players
            WHERE player_id = $1 AND status <> 'withdrawn'
            ORDER BY registered_at DESC, id DESC
            "#,
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        let registrations = rows
            .iter()
            .map(player_registration_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<TournamentId> = registrations.iter().map(|r| r.tournament_id).collect();
        let tournament_rows = sqlx::query("SELECT * FROM tournaments WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;
        let mut tournaments = HashMap::with_capacity(tournament_rows.len());
        for row in &tournament_rows {
            let tournament = tournament_from_row(row)?;
            tournaments.insert(tournament.id, tournament);
        }

        Ok(registrations
            .into_iter()
            .filter_map(|registration| {
                tournaments
                    .get(&registration.tournament_id)
                    .cloned()
                    .map(|tournament| PlayerRegistrationDetail {
                        registration,
                        tournament,
                    })
            })
            .collect())
    }

    async fn active_registrations_for_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> RegistrationResult<TournamentRegistrations> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tournaments WHERE id = $1)")
            .bind(tournament_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(RegistrationError::TournamentNotFound);
        }

        let players = sqlx::query(
            r#"
            SELECT * FROM tournament_players
            WHERE tournament_id = $1 AND status <> 'withdrawn'
            ORDER BY registered_at, id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let teams = sqlx::query(
            r#"
            SELECT * FROM tournament_teams
            WHERE tournament_id = $1 AND status <> 'withdrawn'
            ORDER BY registered_at, id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TournamentRegistrations {
            players: players
                .iter()
                .map(player_registration_from_row)
                .collect::<Result<_, _>>()?,
            teams: teams
                .iter()
                .map(team_registration_from_row)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[async_trait]
impl TeamRepository for PgStore {
    async fn create_team_with_members(&self, team: NewTeam) -> TeamResult<TeamWithMembers> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("INSERT INTO teams (name, description) VALUES ($1, $2) RETURNING *")
            .bind(&team.name)
            .bind(&team.description)
            .fetch_one(&mut *tx)
            .await?;
        let created = team_from_row(&row)?;

        let rows = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, player_id, role)
            VALUES ($1, $2, 'captain'), ($1, $3, 'player')
            RETURNING *
            "#,
        )
        .bind(created.id)
        .bind(team.captain_id)
        .bind(team.partner_id)
        .fetch_all(&mut *tx)
        .await?;
        let mut members = rows
            .iter()
            .map(member_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        members.sort_by_key(|m| m.role != MemberRole::Captain);

        tx.commit().await?;
        Ok(TeamWithMembers {
            team: created,
            members,
        })
    }

    async fn find_team(&self, team_id: TeamId) -> TeamResult<Option<TeamWithMembers>> {
        let Some(row) = sqlx::query("SELECT * FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let team = team_from_row(&row)?;

        let rows = sqlx::query(
            r#"
            SELECT * FROM team_members
            WHERE team_id = $1
            ORDER BY (role = 'captain') DESC, joined_at, player_id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(TeamWithMembers {
            team,
            members: rows.iter().map(member_from_row).collect::<Result<_, _>>()?,
        }))
    }
}

#[async_trait]
impl MatchRepository for PgStore {
    async fn create_match(&self, new_match: NewMatch) -> MatchResult<Match> {
        let row = sqlx::query(
            r#"
            INSERT INTO matches (tournament_id, match_type, status, match_date, round,
                                 player1_id, player2_id, player1_score, player2_score,
                                 team1_id, team2_id, team1_score, team2_score)
            VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new_match.tournament_id)
        .bind(new_match.match_type.as_str())
        .bind(new_match.status.as_str())
        .bind(new_match.match_date)
        .bind(&new_match.round)
        .bind(new_match.player1_id)
        .bind(new_match.player2_id)
        .bind(new_match.player1_score)
        .bind(new_match.player2_score)
        .bind(new_match.team1_id)
        .bind(new_match.team2_id)
        .bind(new_match.team1_score)
        .bind(new_match.team2_score)
        .fetch_one(&self.pool)
        .await
        .map_err(match_write_error)?;

        Ok(match_from_row(&row)?)
    }

    async fn find_match(&self, id: MatchId) -> MatchResult<Option<Match>> {
        let row = sqlx::query("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(match_from_row).transpose()?)
    }

    async fn list_matches(&self) -> MatchResult<Vec<Match>> {
        let rows = sqlx::query("SELECT * FROM matches ORDER BY match_date DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(match_from_row).collect::<Result<_, _>>()?)
    }

    async fn save_match(&self, game: &Match) -> MatchResult<Match> {
        let row = sqlx::query(
            r#"
            UPDATE matches
            SET tournament_id = $2, match_type = $3, status = $4, match_date = $5, round = $6,
                player1_id = $7, player2_id = $8, player1_score = $9, player2_score = $10,
                team1_id = $11, team2_id = $12, team1_score = $13, team2_score = $14,
                winner_player_id = $15, winner_team_id = $16, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(game.id)
        .bind(game.tournament_id)
        .bind(game.match_type.as_str())
        .bind(game.status.as_str())
        .bind(game.match_date)
        .bind(&game.round)
        .bind(game.player1_id)
        .bind(game.player2_id)
        .bind(game.player1_score)
        .bind(game.player2_score)
        .bind(game.team1_id)
        .bind(game.team2_id)
        .bind(game.team1_score)
        .bind(game.team2_score)
        .bind(game.winner_player_id)
        .bind(game.winner_team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(match_write_error)?
        .ok_or(MatchError::NotFound(game.id))?;

        Ok(match_from_row(&row)?)
    }

    async fn delete_match(&self, id: MatchId) -> MatchResult<bool> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    /// `SELECT 1`, bounded so a stalled pool reports unhealthy instead of hanging
    async fn health_check(&self) -> bool {
        match tokio::time::timeout(
            self.health_timeout,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await
        {
            Ok(result) => result.is_ok(),
            Err(_) => {
                log::warn!(
                    "Database health check timed out after {:?}",
                    self.health_timeout
                );
                false
            }
        }
    }
}
