//! Tournament endpoints. Reads are open to any signed-in account; writes
//! are admin only.

use axum::{Extension, extract::State};
use racquet_club::tournament::{NewTournament, TournamentId, TournamentInfo, TournamentUpdate};

use super::{
    AppState,
    error::{ApiJson, ApiPath, ApiResponse, Reply},
    middleware::CurrentUser,
};

pub async fn list_tournaments(State(state): State<AppState>) -> Reply<Vec<TournamentInfo>> {
    let tournaments = state.services.tournaments.list_tournaments().await?;
    Ok(ApiResponse::ok("Tournaments retrieved successfully", tournaments))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
) -> Reply<TournamentInfo> {
    let tournament = state
        .services
        .tournaments
        .get_tournament_info(tournament_id)
        .await?;
    Ok(ApiResponse::ok("Tournament retrieved successfully", tournament))
}

pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiJson(request): ApiJson<NewTournament>,
) -> Reply<TournamentInfo> {
    let tournament = state
        .services
        .tournaments
        .create_tournament(&caller, request)
        .await?;
    Ok(ApiResponse::created("Tournament created successfully", tournament))
}

/// Partial update; status may be set to any value
pub async fn update_tournament(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
    ApiJson(update): ApiJson<TournamentUpdate>,
) -> Reply<TournamentInfo> {
    let tournament = state
        .services
        .tournaments
        .update_tournament(&caller, tournament_id, update)
        .await?;
    Ok(ApiResponse::ok("Tournament updated successfully", tournament))
}

pub async fn delete_tournament(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
) -> Reply<()> {
    state
        .services
        .tournaments
        .delete_tournament(&caller, tournament_id)
        .await?;
    Ok(ApiResponse::message("Tournament deleted successfully"))
}
