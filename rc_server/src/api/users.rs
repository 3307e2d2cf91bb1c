//! Account administration and the player directory.

use axum::{Extension, extract::State};
use racquet_club::auth::{NewPlayerRequest, PlayerUpdate, User, UserId};
use serde::Deserialize;

use super::{
    AppState,
    error::{ApiJson, ApiPath, ApiResponse, Reply},
    middleware::CurrentUser,
};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Every account (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Reply<Vec<User>> {
    let users = state.services.auth.list_users(&caller).await?;
    Ok(ApiResponse::ok("Users retrieved successfully", users))
}

/// Change an account's role (admin only); the body is `{"role": "player" | "admin"}`
pub async fn update_role(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(request): ApiJson<UpdateRoleRequest>,
) -> Reply<User> {
    let user = state
        .services
        .auth
        .update_role(&caller, user_id, &request.role)
        .await?;
    Ok(ApiResponse::ok("User role updated successfully", user))
}

pub async fn list_players(State(state): State<AppState>) -> Reply<Vec<User>> {
    let players = state.services.auth.list_players().await?;
    Ok(ApiResponse::ok("Players retrieved successfully", players))
}

pub async fn get_player(
    State(state): State<AppState>,
    ApiPath(player_id): ApiPath<UserId>,
) -> Reply<User> {
    let player = state.services.auth.get_player(player_id).await?;
    Ok(ApiResponse::ok("Player retrieved successfully", player))
}

pub async fn create_player(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiJson(request): ApiJson<NewPlayerRequest>,
) -> Reply<User> {
    let player = state.services.auth.create_player(&caller, request).await?;
    Ok(ApiResponse::created("Player created successfully", player))
}

pub async fn update_player(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(player_id): ApiPath<UserId>,
    ApiJson(update): ApiJson<PlayerUpdate>,
) -> Reply<User> {
    let player = state
        .services
        .auth
        .update_player(&caller, player_id, update)
        .await?;
    Ok(ApiResponse::ok("Player updated successfully", player))
}

pub async fn delete_player(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiPath(player_id): ApiPath<UserId>,
) -> Reply<()> {
    state.services.auth.delete_player(&caller, player_id).await?;
    Ok(ApiResponse::message("Player deleted successfully"))
}
