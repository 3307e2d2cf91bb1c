//! Team endpoints.

use axum::{Extension, extract::State};
use racquet_club::team::{CreateTeamRequest, TeamId, TeamWithMembers};

use super::{
    AppState,
    error::{ApiJson, ApiPath, ApiResponse, Reply},
    middleware::CurrentUser,
};

/// Create a two-player team; the caller becomes captain
pub async fn create_team(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiJson(request): ApiJson<CreateTeamRequest>,
) -> Reply<TeamWithMembers> {
    let team = state.services.teams.create_team(&caller, request).await?;
    Ok(ApiResponse::created("Team created successfully", team))
}

pub async fn get_team(
    State(state): State<AppState>,
    ApiPath(team_id): ApiPath<TeamId>,
) -> Reply<TeamWithMembers> {
    let team = state.services.teams.get_team(team_id).await?;
    Ok(ApiResponse::ok("Team retrieved successfully", team))
}
