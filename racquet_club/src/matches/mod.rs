//! Match records.
//!
//! Plain CRUD plus [`MatchManager::set_winner`], which records the winning
//! player or team and marks the match completed.

pub mod manager;
pub mod models;

pub use manager::{MatchError, MatchManager, MatchResult};
pub use models::{Match, MatchId, MatchStatus, MatchType, MatchUpdate, NewMatch, WinnerRequest};
