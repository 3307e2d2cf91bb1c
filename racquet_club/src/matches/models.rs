//! Match data models.

use super::MatchError;
use crate::auth::UserId;
use crate::error::ParseEnumError;
use crate::team::TeamId;
use crate::tournament::{TournamentId, TournamentType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Match ID type
pub type MatchId = i64;

/// Matches share the singles/doubles distinction with tournaments
pub type MatchType = TournamentType;

/// Match status; no transition rules are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Ongoing,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Ongoing => "ongoing",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "ongoing" => Ok(MatchStatus::Ongoing),
            "completed" => Ok(MatchStatus::Completed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(ParseEnumError::new("match status", other)),
        }
    }
}

/// Match record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// Cleared when the tournament is deleted
    pub tournament_id: Option<TournamentId>,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub status: MatchStatus,
    pub match_date: DateTime<Utc>,
    pub round: String,
    pub player1_id: Option<UserId>,
    pub player2_id: Option<UserId>,
    pub player1_score: i32,
    pub player2_score: i32,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub team1_score: i32,
    pub team2_score: i32,
    pub winner_player_id: Option<UserId>,
    pub winner_team_id: Option<TeamId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Record the winner and mark the match completed.
    ///
    /// Singles matches take a player reference, doubles matches a team
    /// reference. Whether the winner actually played is not checked.
    pub fn set_winner(&mut self, winner: &WinnerRequest) -> Result<(), MatchError> {
        match self.match_type {
            TournamentType::Singles => {
                let player_id = winner.player_id.ok_or_else(|| {
                    MatchError::InvalidInput("singles match winner requires player_id".to_string())
                })?;
                self.winner_player_id = Some(player_id);
            }
            TournamentType::Doubles => {
                let team_id = winner.team_id.ok_or_else(|| {
                    MatchError::InvalidInput("doubles match winner requires team_id".to_string())
                })?;
                self.winner_team_id = Some(team_id);
            }
        }
        self.status = MatchStatus::Completed;
        Ok(())
    }

    /// Overwrite every field present in `update`
    pub fn apply(&mut self, update: MatchUpdate) {
        if let Some(tournament_id) = update.tournament_id {
            self.tournament_id = Some(tournament_id);
        }
        if let Some(match_type) = update.match_type {
            self.match_type = match_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(match_date) = update.match_date {
            self.match_date = match_date;
        }
        if let Some(round) = update.round {
            self.round = round;
        }
        if let Some(id) = update.player1_id {
            self.player1_id = Some(id);
        }
        if let Some(id) = update.player2_id {
            self.player2_id = Some(id);
        }
        if let Some(score) = update.player1_score {
            self.player1_score = score;
        }
        if let Some(score) = update.player2_score {
            self.player2_score = score;
        }
        if let Some(id) = update.team1_id {
            self.team1_id = Some(id);
        }
        if let Some(id) = update.team2_id {
            self.team2_id = Some(id);
        }
        if let Some(score) = update.team1_score {
            self.team1_score = score;
        }
        if let Some(score) = update.team2_score {
            self.team2_score = score;
        }
    }
}

/// Match creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMatch {
    #[serde(default)]
    pub tournament_id: Option<TournamentId>,
    #[serde(rename = "type", default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub status: MatchStatus,
    /// Defaults to the creation time
    #[serde(default)]
    pub match_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub round: String,
    #[serde(default)]
    pub player1_id: Option<UserId>,
    #[serde(default)]
    pub player2_id: Option<UserId>,
    #[serde(default)]
    pub player1_score: i32,
    #[serde(default)]
    pub player2_score: i32,
    #[serde(default)]
    pub team1_id: Option<TeamId>,
    #[serde(default)]
    pub team2_id: Option<TeamId>,
    #[serde(default)]
    pub team1_score: i32,
    #[serde(default)]
    pub team2_score: i32,
}

/// Partial match update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub tournament_id: Option<TournamentId>,
    #[serde(rename = "type")]
    pub match_type: Option<MatchType>,
    pub status: Option<MatchStatus>,
    pub match_date: Option<DateTime<Utc>>,
    pub round: Option<String>,
    pub player1_id: Option<UserId>,
    pub player2_id: Option<UserId>,
    pub player1_score: Option<i32>,
    pub player2_score: Option<i32>,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub team1_score: Option<i32>,
    pub team2_score: Option<i32>,
}

/// Winner reference; the one matching the match type is used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WinnerRequest {
    #[serde(default)]
    pub player_id: Option<UserId>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match(match_type: MatchType) -> Match {
        Match {
            id: 1,
            tournament_id: Some(3),
            match_type,
            status: MatchStatus::Ongoing,
            match_date: Utc::now(),
            round: "semifinal".to_string(),
            player1_id: Some(10),
            player2_id: Some(11),
            player1_score: 21,
            player2_score: 17,
            team1_id: None,
            team2_id: None,
            team1_score: 0,
            team2_score: 0,
            winner_player_id: None,
            winner_team_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_singles_winner_is_a_player() {
        let mut game = sample_match(TournamentType::Singles);
        game.set_winner(&WinnerRequest {
            player_id: Some(10),
            team_id: Some(99),
        })
        .unwrap();

        assert_eq!(game.winner_player_id, Some(10));
        assert_eq!(game.winner_team_id, None);
        assert_eq!(game.status, MatchStatus::Completed);
    }

    #[test]
    fn test_doubles_winner_is_a_team() {
        let mut game = sample_match(TournamentType::Doubles);
        game.set_winner(&WinnerRequest {
            player_id: None,
            team_id: Some(4),
        })
        .unwrap();

        assert_eq!(game.winner_team_id, Some(4));
        assert_eq!(game.winner_player_id, None);
    }

    #[test]
    fn test_winner_reference_must_match_type() {
        let mut game = sample_match(TournamentType::Doubles);
        let err = game
            .set_winner(&WinnerRequest {
                player_id: Some(10),
                team_id: None,
            })
            .unwrap_err();

        assert!(matches!(err, MatchError::InvalidInput(_)));
        assert_eq!(game.status, MatchStatus::Ongoing);
    }

    #[test]
    fn test_winner_is_not_checked_against_participants() {
        let mut game = sample_match(TournamentType::Singles);
        game.set_winner(&WinnerRequest {
            player_id: Some(500),
            team_id: None,
        })
        .unwrap();
        assert_eq!(game.winner_player_id, Some(500));
    }

    #[test]
    fn test_apply_partial_update() {
        let mut game = sample_match(TournamentType::Singles);
        game.apply(MatchUpdate {
            player2_score: Some(21),
            status: Some(MatchStatus::Cancelled),
            ..Default::default()
        });

        assert_eq!(game.player1_score, 21);
        assert_eq!(game.player2_score, 21);
        assert_eq!(game.status, MatchStatus::Cancelled);
        assert_eq!(game.round, "semifinal");
    }
}
