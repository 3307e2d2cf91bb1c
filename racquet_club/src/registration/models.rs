//! Registration data models.

use crate::auth::UserId;
use crate::error::ParseEnumError;
use crate::team::TeamId;
use crate::tournament::{Tournament, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registration ID type
pub type RegistrationId = i64;

/// Registration status; rows are withdrawn, never deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Confirmed,
    Withdrawn,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Every status other than `Withdrawn` holds a slot
    pub fn is_active(&self) -> bool {
        *self != RegistrationStatus::Withdrawn
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(RegistrationStatus::Registered),
            "confirmed" => Ok(RegistrationStatus::Confirmed),
            "withdrawn" => Ok(RegistrationStatus::Withdrawn),
            other => Err(ParseEnumError::new("registration status", other)),
        }
    }
}

/// Individual player registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRegistration {
    pub id: RegistrationId,
    pub tournament_id: TournamentId,
    pub player_id: UserId,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

/// Team registration for a doubles tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistration {
    pub id: RegistrationId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

/// One of the caller's active registrations with its tournament
#[derive(Debug, Clone, Serialize)]
pub struct PlayerRegistrationDetail {
    #[serde(flatten)]
    pub registration: PlayerRegistration,
    pub tournament: Tournament,
}

/// Active registrations of a single tournament
#[derive(Debug, Clone, Default, Serialize)]
pub struct TournamentRegistrations {
    pub players: Vec<PlayerRegistration>,
    pub teams: Vec<TeamRegistration>,
}
