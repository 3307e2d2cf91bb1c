//! Team data models.

use crate::auth::UserId;
use crate::error::ParseEnumError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Team ID type
pub type TeamId = i64;

/// Role of a player inside a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Captain,
    Player,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Captain => "captain",
            MemberRole::Player => "player",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "captain" => Ok(MemberRole::Captain),
            "player" => Ok(MemberRole::Player),
            other => Err(ParseEnumError::new("team role", other)),
        }
    }
}

/// Team record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Membership of one player in one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub team_id: TeamId,
    pub player_id: UserId,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// Team together with its memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamWithMembers {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
}

impl TeamWithMembers {
    pub fn has_member(&self, player_id: UserId) -> bool {
        self.members.iter().any(|m| m.player_id == player_id)
    }

    pub fn captain(&self) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.role == MemberRole::Captain)
    }
}

/// Team creation request; the caller becomes captain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub partner_id: UserId,
}

/// Validated team to insert along with both memberships
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    pub captain_id: UserId,
    pub partner_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(player_id: UserId, role: MemberRole) -> TeamMember {
        TeamMember {
            team_id: 1,
            player_id,
            role,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn test_membership_lookup() {
        let team = TeamWithMembers {
            team: Team {
                id: 1,
                name: "Net Rushers".to_string(),
                description: String::new(),
                created_at: Utc::now(),
            },
            members: vec![member(10, MemberRole::Captain), member(11, MemberRole::Player)],
        };

        assert!(team.has_member(10));
        assert!(team.has_member(11));
        assert!(!team.has_member(12));
        assert_eq!(team.captain().map(|m| m.player_id), Some(10));
    }

    #[test]
    fn test_member_role_text() {
        assert_eq!("captain".parse::<MemberRole>().unwrap(), MemberRole::Captain);
        assert_eq!(MemberRole::Player.to_string(), "player");
        assert!("coach".parse::<MemberRole>().is_err());
    }
}
