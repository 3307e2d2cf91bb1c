//! Match record store.

use super::models::{Match, MatchId, MatchUpdate, NewMatch, WinnerRequest};
use crate::db::MatchRepository;
use crate::error::{ClassifiedError, ErrorKind};
use std::sync::Arc;
use thiserror::Error;

/// Longest accepted round label, in characters
pub const MAX_ROUND_LEN: usize = 64;

/// Match errors
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Match not found: {0}")]
    NotFound(MatchId),

    #[error("Invalid match: {0}")]
    InvalidInput(String),
}

impl ClassifiedError for MatchError {
    fn kind(&self) -> ErrorKind {
        match self {
            MatchError::Database(_) => ErrorKind::Internal,
            MatchError::NotFound(_) => ErrorKind::NotFound,
            MatchError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            MatchError::Database(_) => "database_error",
            MatchError::NotFound(_) => "match_not_found",
            MatchError::InvalidInput(_) => "invalid_input",
        }
    }

    fn client_message(&self) -> String {
        match self {
            MatchError::Database(_) => "Internal server error".to_string(),
            MatchError::NotFound(_) => "Match not found".to_string(),
            MatchError::InvalidInput(_) => self.to_string(),
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

/// Match manager; any authenticated caller may use it
#[derive(Clone)]
pub struct MatchManager {
    matches: Arc<dyn MatchRepository>,
}

impl MatchManager {
    pub fn new(matches: Arc<dyn MatchRepository>) -> Self {
        Self { matches }
    }

    pub async fn create_match(&self, mut request: NewMatch) -> MatchResult<Match> {
        request.round = validate_round(&request.round)?;
        let game = self.matches.create_match(request).await?;
        log::info!("Created {} match {}", game.match_type, game.id);
        Ok(game)
    }

    pub async fn get_match(&self, id: MatchId) -> MatchResult<Match> {
        self.matches
            .find_match(id)
            .await?
            .ok_or(MatchError::NotFound(id))
    }

    pub async fn list_matches(&self) -> MatchResult<Vec<Match>> {
        self.matches.list_matches().await
    }

    pub async fn update_match(&self, id: MatchId, mut update: MatchUpdate) -> MatchResult<Match> {
        if let Some(round) = &update.round {
            update.round = Some(validate_round(round)?);
        }
        let mut game = self.get_match(id).await?;
        game.apply(update);
        self.matches.save_match(&game).await
    }

    /// Record the winner; the match becomes completed
    pub async fn set_winner(&self, id: MatchId, winner: WinnerRequest) -> MatchResult<Match> {
        let mut game = self.get_match(id).await?;
        game.set_winner(&winner)?;
        let game = self.matches.save_match(&game).await?;
        log::info!(
            "Match {} completed, winner player {:?} team {:?}",
            game.id,
            game.winner_player_id,
            game.winner_team_id
        );
        Ok(game)
    }

    pub async fn delete_match(&self, id: MatchId) -> MatchResult<()> {
        if !self.matches.delete_match(id).await? {
            return Err(MatchError::NotFound(id));
        }
        log::info!("Deleted match {}", id);
        Ok(())
    }
}

fn validate_round(round: &str) -> MatchResult<String> {
    let round = round.trim();
    if round.chars().count() > MAX_ROUND_LEN {
        return Err(MatchError::InvalidInput(format!(
            "round cannot exceed {MAX_ROUND_LEN} characters"
        )));
    }
    Ok(round.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NewUser, Role, User};
    use crate::db::{MemoryStore, TeamRepository, UserRepository};
    use crate::matches::MatchStatus;
    use crate::team::NewTeam;
    use crate::tournament::TournamentType;

    fn manager() -> MatchManager {
        MatchManager::new(Arc::new(MemoryStore::new()))
    }

    async fn player(store: &MemoryStore, username: &str) -> User {
        store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@club.test"),
                password_hash: "hash".to_string(),
                full_name: username.to_string(),
                role: Role::Player,
                ranking: 0,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let matches = manager();
        let game = matches.create_match(NewMatch::default()).await.unwrap();

        assert_eq!(game.match_type, TournamentType::Singles);
        assert_eq!(game.status, MatchStatus::Pending);
        assert_eq!(game.player1_score, 0);
        assert_eq!(game.winner_player_id, None);
    }

    #[tokio::test]
    async fn test_set_winner_persists_completion() {
        let store = Arc::new(MemoryStore::new());
        let mut team_ids = Vec::new();
        for (name, captain, partner) in [("Aces", "ana", "bea"), ("Lobs", "cid", "dan")] {
            let captain = player(&store, captain).await;
            let partner = player(&store, partner).await;
            let team = store
                .create_team_with_members(NewTeam {
                    name: name.to_string(),
                    description: String::new(),
                    captain_id: captain.id,
                    partner_id: partner.id,
                })
                .await
                .unwrap();
            team_ids.push(team.team.id);
        }

        let matches = MatchManager::new(store);
        let game = matches
            .create_match(NewMatch {
                match_type: TournamentType::Doubles,
                team1_id: Some(team_ids[0]),
                team2_id: Some(team_ids[1]),
                ..Default::default()
            })
            .await
            .unwrap();

        matches
            .set_winner(
                game.id,
                WinnerRequest {
                    player_id: None,
                    team_id: Some(team_ids[1]),
                },
            )
            .await
            .unwrap();

        let stored = matches.get_match(game.id).await.unwrap();
        assert_eq!(stored.status, MatchStatus::Completed);
        assert_eq!(stored.winner_team_id, Some(team_ids[1]));
    }

    #[tokio::test]
    async fn test_references_must_exist() {
        let store = Arc::new(MemoryStore::new());
        let ana = player(&store, "ana").await;
        let matches = MatchManager::new(store);

        for request in [
            NewMatch {
                player1_id: Some(ana.id),
                player2_id: Some(9999),
                ..Default::default()
            },
            NewMatch {
                tournament_id: Some(42),
                ..Default::default()
            },
            NewMatch {
                match_type: TournamentType::Doubles,
                team1_id: Some(7),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                matches.create_match(request).await,
                Err(MatchError::InvalidInput(_))
            ));
        }
        assert!(matches.list_matches().await.unwrap().is_empty());

        let game = matches
            .create_match(NewMatch {
                player1_id: Some(ana.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(matches!(
            matches
                .set_winner(
                    game.id,
                    WinnerRequest {
                        player_id: Some(9999),
                        team_id: None,
                    },
                )
                .await,
            Err(MatchError::InvalidInput(_))
        ));
        assert!(matches!(
            matches
                .update_match(
                    game.id,
                    MatchUpdate {
                        player2_id: Some(9999),
                        ..Default::default()
                    },
                )
                .await,
            Err(MatchError::InvalidInput(_))
        ));

        let stored = matches.get_match(game.id).await.unwrap();
        assert_eq!(stored.status, MatchStatus::Pending);
        assert_eq!(stored.player2_id, None);
    }

    #[tokio::test]
    async fn test_round_length_is_capped() {
        let matches = manager();
        let err = matches
            .create_match(NewMatch {
                round: "r".repeat(MAX_ROUND_LEN + 1),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput(_)));

        let game = matches
            .create_match(NewMatch {
                round: format!(" {} ", "r".repeat(MAX_ROUND_LEN)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(game.round.len(), MAX_ROUND_LEN);

        let err = matches
            .update_match(
                game.id,
                MatchUpdate {
                    round: Some("q".repeat(MAX_ROUND_LEN + 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput(_)));
        assert_eq!(matches.get_match(game.id).await.unwrap().round, game.round);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let matches = manager();
        let game = matches.create_match(NewMatch::default()).await.unwrap();

        let updated = matches
            .update_match(
                game.id,
                MatchUpdate {
                    round: Some("final".to_string()),
                    player1_score: Some(21),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.round, "final");
        assert_eq!(updated.player1_score, 21);

        matches.delete_match(game.id).await.unwrap();
        assert!(matches!(
            matches.get_match(game.id).await,
            Err(MatchError::NotFound(_))
        ));
        assert!(matches!(
            matches.delete_match(game.id).await,
            Err(MatchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_winner_on_missing_match() {
        let matches = manager();
        let err = matches
            .set_winner(7, WinnerRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::NotFound(7)));
    }
}
