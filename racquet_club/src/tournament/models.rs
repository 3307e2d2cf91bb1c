//! Tournament data models.

use crate::auth::UserId;
use crate::error::ParseEnumError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tournament ID type
pub type TournamentId = i64;

/// Default player capacity for singles tournaments
pub const DEFAULT_MAX_PLAYERS: i32 = 16;

/// Default team capacity for doubles tournaments
pub const DEFAULT_MAX_TEAMS: i32 = 8;

/// Tournament type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentType {
    #[default]
    Singles,
    Doubles,
}

impl TournamentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentType::Singles => "singles",
            TournamentType::Doubles => "doubles",
        }
    }
}

impl fmt::Display for TournamentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singles" => Ok(TournamentType::Singles),
            "doubles" => Ok(TournamentType::Doubles),
            other => Err(ParseEnumError::new("tournament type", other)),
        }
    }
}

/// Tournament status.
///
/// Any status may be set to any other one; only `Upcoming` accepts
/// registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "ongoing" => Ok(TournamentStatus::Ongoing),
            "completed" => Ok(TournamentStatus::Completed),
            "cancelled" => Ok(TournamentStatus::Cancelled),
            other => Err(ParseEnumError::new("tournament status", other)),
        }
    }
}

/// Tournament record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub tournament_type: TournamentType,
    pub status: TournamentStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_players: i32,
    /// Used instead of `max_players` for doubles tournaments
    pub max_teams: i32,
    pub entry_fee: f64,
    pub prize_pool: f64,
    /// Creator; never changes
    pub admin_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_team_tournament(&self) -> bool {
        self.tournament_type == TournamentType::Doubles
    }

    /// Maximum number of concurrent active registrations
    pub fn capacity(&self) -> i64 {
        if self.is_team_tournament() {
            i64::from(self.max_teams)
        } else {
            i64::from(self.max_players)
        }
    }

    pub fn accepts_registrations(&self) -> bool {
        self.status == TournamentStatus::Upcoming
    }

    /// Overwrite every field present in `update`
    pub fn apply(&mut self, update: TournamentUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(tournament_type) = update.tournament_type {
            self.tournament_type = tournament_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = update.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(max_players) = update.max_players {
            self.max_players = max_players;
        }
        if let Some(max_teams) = update.max_teams {
            self.max_teams = max_teams;
        }
        if let Some(entry_fee) = update.entry_fee {
            self.entry_fee = entry_fee;
        }
        if let Some(prize_pool) = update.prize_pool {
            self.prize_pool = prize_pool;
        }
    }
}

fn default_max_players() -> i32 {
    DEFAULT_MAX_PLAYERS
}

fn default_max_teams() -> i32 {
    DEFAULT_MAX_TEAMS
}

/// Tournament creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub tournament_type: TournamentType,
    #[serde(default)]
    pub status: TournamentStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_max_players")]
    pub max_players: i32,
    #[serde(default = "default_max_teams")]
    pub max_teams: i32,
    #[serde(default)]
    pub entry_fee: f64,
    #[serde(default)]
    pub prize_pool: f64,
}

impl NewTournament {
    /// Singles tournament with default capacities
    pub fn singles(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tournament_type: TournamentType::Singles,
            status: TournamentStatus::Upcoming,
            start_date: None,
            end_date: None,
            max_players: DEFAULT_MAX_PLAYERS,
            max_teams: DEFAULT_MAX_TEAMS,
            entry_fee: 0.0,
            prize_pool: 0.0,
        }
    }

    /// Doubles tournament with default capacities
    pub fn doubles(name: impl Into<String>) -> Self {
        Self {
            tournament_type: TournamentType::Doubles,
            ..Self::singles(name)
        }
    }
}

/// Partial tournament update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub tournament_type: Option<TournamentType>,
    pub status: Option<TournamentStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_players: Option<i32>,
    pub max_teams: Option<i32>,
    pub entry_fee: Option<f64>,
    pub prize_pool: Option<f64>,
}

/// Active registration counts for one tournament
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCounts {
    pub players: i64,
    pub teams: i64,
}

/// Tournament with derived capacity information
#[derive(Debug, Clone, Serialize)]
pub struct TournamentInfo {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub capacity: i64,
    pub registered_players: i64,
    pub registered_teams: i64,
}

impl TournamentInfo {
    pub fn new(tournament: Tournament, counts: RegistrationCounts) -> Self {
        Self {
            capacity: tournament.capacity(),
            registered_players: counts.players,
            registered_teams: counts.teams,
            tournament,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_tournament(tournament_type: TournamentType) -> Tournament {
    Tournament {
        id: 1,
        name: "Club Open".to_string(),
        description: String::new(),
        tournament_type,
        status: TournamentStatus::Upcoming,
        start_date: None,
        end_date: None,
        max_players: 16,
        max_teams: 8,
        entry_fee: 0.0,
        prize_pool: 0.0,
        admin_id: 1,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_follows_tournament_type() {
        let singles = sample_tournament(TournamentType::Singles);
        assert_eq!(singles.capacity(), 16);

        let doubles = sample_tournament(TournamentType::Doubles);
        assert_eq!(doubles.capacity(), 8);
    }

    #[test]
    fn test_only_upcoming_accepts_registrations() {
        let mut tournament = sample_tournament(TournamentType::Singles);
        assert!(tournament.accepts_registrations());

        for status in [
            TournamentStatus::Ongoing,
            TournamentStatus::Completed,
            TournamentStatus::Cancelled,
        ] {
            tournament.status = status;
            assert!(!tournament.accepts_registrations());
        }
    }

    #[test]
    fn test_apply_allows_any_status_change() {
        let mut tournament = sample_tournament(TournamentType::Singles);
        tournament.status = TournamentStatus::Completed;

        tournament.apply(TournamentUpdate {
            status: Some(TournamentStatus::Upcoming),
            ..Default::default()
        });

        assert_eq!(tournament.status, TournamentStatus::Upcoming);
    }

    #[test]
    fn test_apply_leaves_absent_fields_untouched() {
        let mut tournament = sample_tournament(TournamentType::Doubles);
        tournament.apply(TournamentUpdate {
            name: Some("Winter Doubles".to_string()),
            max_teams: Some(4),
            ..Default::default()
        });

        assert_eq!(tournament.name, "Winter Doubles");
        assert_eq!(tournament.max_teams, 4);
        assert_eq!(tournament.max_players, 16);
        assert_eq!(tournament.tournament_type, TournamentType::Doubles);
        assert_eq!(tournament.admin_id, 1);
    }

    #[test]
    fn test_new_tournament_defaults_from_json() {
        let request: NewTournament = serde_json::from_str(r#"{"name": "Spring Cup"}"#).unwrap();
        assert_eq!(request.tournament_type, TournamentType::Singles);
        assert_eq!(request.status, TournamentStatus::Upcoming);
        assert_eq!(request.max_players, DEFAULT_MAX_PLAYERS);
        assert_eq!(request.max_teams, DEFAULT_MAX_TEAMS);
    }

    #[test]
    fn test_info_reports_capacity() {
        let info = TournamentInfo::new(
            sample_tournament(TournamentType::Doubles),
            RegistrationCounts { players: 0, teams: 3 },
        );
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "doubles");
        assert_eq!(json["capacity"], 8);
        assert_eq!(json["registered_teams"], 3);
    }
}
