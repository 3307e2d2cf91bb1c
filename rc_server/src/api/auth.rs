//! Account endpoints: registration, login, own profile and password.
//!
//! Register a new player:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "ana", "email": "ana@club.test", "password": "secret1", "full_name": "Ana"}'
//! ```
//!
//! Login with a username or an email address:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"login": "ana", "password": "secret1"}'
//! ```

use axum::{Extension, extract::State};
use racquet_club::auth::{
    AuthError, AuthSession, LoginRequest, ProfileUpdate, RegisterRequest, User,
};
use serde::Deserialize;

use super::{
    AppState,
    error::{ApiJson, ApiResponse, Reply},
    middleware::CurrentUser,
};
use crate::logging::log_security_event;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Create a player account and return it with an access token.
///
/// # Errors
///
/// - `400`: invalid username, email or a password shorter than 6 characters
/// - `409`: username or email already taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Reply<AuthSession> {
    let session = state.services.auth.register(request).await?;
    Ok(ApiResponse::created("User registered successfully", session))
}

/// Exchange credentials for an access token.
///
/// Unknown accounts and wrong passwords produce the same `401` so the
/// response does not reveal which usernames exist.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Reply<AuthSession> {
    let login = request.login.clone();
    match state.services.auth.login(request).await {
        Ok(session) => Ok(ApiResponse::ok("Login successful", session)),
        Err(err) => {
            if matches!(
                err,
                AuthError::InvalidCredentials | AuthError::AccountDeactivated
            ) {
                log_security_event("failed_login", None, &format!("{err} for {login}"));
            }
            Err(err.into())
        }
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Reply<User> {
    let user = state.services.auth.profile(caller.id).await?;
    Ok(ApiResponse::ok("Profile retrieved successfully", user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Reply<User> {
    let user = state.services.auth.update_profile(&caller, update).await?;
    Ok(ApiResponse::ok("Profile updated successfully", user))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Reply<()> {
    state
        .services
        .auth
        .change_password(&caller, &request.current_password, &request.new_password)
        .await?;
    Ok(ApiResponse::message("Password changed successfully"))
}
