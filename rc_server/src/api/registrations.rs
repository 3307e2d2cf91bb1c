//! Registration endpoints for players and teams.
//!
//! Admission itself (status, duplicate and capacity checks) happens
//! atomically in the store; these handlers only translate HTTP.

use axum::{Extension, extract::State};
use racquet_club::registration::{
    PlayerRegistration, PlayerRegistrationDetail, TeamRegistration, TournamentRegistrations,
};
use racquet_club::team::TeamId;
use racquet_club::tournament::TournamentId;
use serde::Deserialize;

use super::{
    AppState,
    error::{ApiJson, ApiPath, ApiResponse, Reply},
    middleware::CurrentUser,
};

/// Body of the team registration endpoints
#[derive(Debug, Deserialize)]
pub struct TeamRegistrationRequest {
    pub team_id: TeamId,
}

pub async fn register_player(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
) -> Reply<PlayerRegistration> {
    let registration = state
        .services
        .registrations
        .register_player(&caller, tournament_id)
        .await?;
    Ok(ApiResponse::created(
        "Successfully registered for tournament",
        registration,
    ))
}

pub async fn unregister_player(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
) -> Reply<PlayerRegistration> {
    let registration = state
        .services
        .registrations
        .unregister_player(&caller, tournament_id)
        .await?;
    Ok(ApiResponse::ok(
        "Successfully unregistered from tournament",
        registration,
    ))
}

pub async fn my_registrations(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Reply<Vec<PlayerRegistrationDetail>> {
    let registrations = state
        .services
        .registrations
        .my_registrations(&caller)
        .await?;
    Ok(ApiResponse::ok(
        "Registrations retrieved successfully",
        registrations,
    ))
}

pub async fn tournament_registrations(
    State(state): State<AppState>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
) -> Reply<TournamentRegistrations> {
    let registrations = state
        .services
        .registrations
        .tournament_registrations(tournament_id)
        .await?;
    Ok(ApiResponse::ok(
        "Registrations retrieved successfully",
        registrations,
    ))
}

pub async fn register_team(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
    ApiJson(request): ApiJson<TeamRegistrationRequest>,
) -> Reply<TeamRegistration> {
    let registration = state
        .services
        .registrations
        .register_team(&caller, tournament_id, request.team_id)
        .await?;
    Ok(ApiResponse::created(
        "Team successfully registered for tournament",
        registration,
    ))
}

pub async fn withdraw_team(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(tournament_id): ApiPath<TournamentId>,
    ApiJson(request): ApiJson<TeamRegistrationRequest>,
) -> Reply<TeamRegistration> {
    let registration = state
        .services
        .registrations
        .withdraw_team(&caller, tournament_id, request.team_id)
        .await?;
    Ok(ApiResponse::ok(
        "Team successfully withdrawn from tournament",
        registration,
    ))
}
