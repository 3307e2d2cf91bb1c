//! Authentication middleware for protected endpoints.
//!
//! The middleware reads the `Authorization: Bearer <token>` header, verifies
//! the token and loads the account it names. Handlers receive the fresh
//! record through [`CurrentUser`], so role changes and deactivation apply to
//! tokens that were issued earlier.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use rc_server::api::middleware::auth_middleware;
//! # use rc_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router = Router::new()
//!     .route("/api/protected", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
//!     .with_state(state);
//! # let _ = protected_routes;
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use racquet_club::auth::{AuthError, User};

use super::{AppState, error::ApiError};
use crate::logging::log_security_event;

/// The authenticated caller, inserted into request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract the bearer token from an `Authorization` header value
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Authentication middleware that validates JWT tokens and injects the caller.
///
/// # Behavior
///
/// - **Success**: Token valid and account active → Injects [`CurrentUser`] → Calls next handler
/// - **Missing header**: `401 missing_token`
/// - **Invalid/expired token**: `401 invalid_token`
/// - **Deactivated account**: `401 account_deactivated`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(&request) else {
        return Err(AuthError::MissingToken.into());
    };

    let user = match state.services.auth.authenticate(&token).await {
        Ok(user) => user,
        Err(err) => {
            log_security_event("rejected_token", None, &err.to_string());
            return Err(err.into());
        }
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
