//! Match endpoints. Any signed-in account may manage matches.

use axum::extract::State;
use racquet_club::matches::{Match, MatchId, MatchUpdate, NewMatch, WinnerRequest};

use super::{
    AppState,
    error::{ApiJson, ApiPath, ApiResponse, Reply},
};

pub async fn list_matches(State(state): State<AppState>) -> Reply<Vec<Match>> {
    let matches = state.services.matches.list_matches().await?;
    Ok(ApiResponse::ok("Matches retrieved successfully", matches))
}

pub async fn get_match(
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<MatchId>,
) -> Reply<Match> {
    let game = state.services.matches.get_match(match_id).await?;
    Ok(ApiResponse::ok("Match retrieved successfully", game))
}

pub async fn create_match(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewMatch>,
) -> Reply<Match> {
    let game = state.services.matches.create_match(request).await?;
    Ok(ApiResponse::created("Match created successfully", game))
}

pub async fn update_match(
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<MatchId>,
    ApiJson(update): ApiJson<MatchUpdate>,
) -> Reply<Match> {
    let game = state
        .services
        .matches
        .update_match(match_id, update)
        .await?;
    Ok(ApiResponse::ok("Match updated successfully", game))
}

/// Record the winner: `{"player_id": ..}` for singles, `{"team_id": ..}` for doubles
pub async fn set_winner(
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<MatchId>,
    ApiJson(winner): ApiJson<WinnerRequest>,
) -> Reply<Match> {
    let game = state.services.matches.set_winner(match_id, winner).await?;
    Ok(ApiResponse::ok("Match winner set successfully", game))
}

pub async fn delete_match(
    State(state): State<AppState>,
    ApiPath(match_id): ApiPath<MatchId>,
) -> Reply<()> {
    state.services.matches.delete_match(match_id).await?;
    Ok(ApiResponse::message("Match deleted successfully"))
}
