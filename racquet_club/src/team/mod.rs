//! Doubles teams: exactly two players, one captain and one player.

pub mod manager;
pub mod models;

pub use manager::{TeamError, TeamManager, TeamResult};
pub use models::{
    CreateTeamRequest, MemberRole, NewTeam, Team, TeamId, TeamMember, TeamWithMembers,
};
