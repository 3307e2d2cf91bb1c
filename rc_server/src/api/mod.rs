//! HTTP API for the racquet club backend.
//!
//! # Modules
//!
//! - [`auth`]: registration, login, own profile and password
//! - [`users`]: account administration and the player directory
//! - [`tournaments`]: tournament registry
//! - [`registrations`]: player and team registrations
//! - [`teams`]: two-player teams
//! - [`matches`]: match records and winners
//! - [`middleware`]: bearer-token authentication for protected endpoints
//! - [`request_id`]: `x-request-id` propagation and request logging
//! - [`error`]: response envelopes and error mapping
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use racquet_club::ClubServices;
//! use racquet_club::db::MemoryStore;
//! use rc_server::api::{AppState, create_router};
//! use std::sync::Arc;
//! use tower_http::cors::CorsLayer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let state = AppState {
//!     services: ClubServices::new(store.clone(), "pepper".into(), "secret".into()),
//!     store,
//! };
//!
//! let app = create_router(state, CorsLayer::permissive());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! - Protected endpoints require `Authorization: Bearer <jwt>`
//! - The account named by the token is reloaded on every request; its
//!   current role and active flag decide access
//! - Role gates run in the domain managers before any state is touched

pub mod auth;
pub mod error;
pub mod matches;
pub mod middleware;
pub mod registrations;
pub mod request_id;
pub mod teams;
pub mod tournaments;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use racquet_club::{ClubServices, db::StoreHealth};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Domain managers wired to the store
    pub services: ClubServices,
    /// The same store, for health checks
    pub store: Arc<dyn StoreHealth>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET    /health                                   public
/// POST   /api/v1/register                          public
/// POST   /api/v1/login                             public
/// GET    /api/v1/profile                           bearer
/// PUT    /api/v1/profile                           bearer
/// POST   /api/v1/change-password                   bearer
/// GET    /api/v1/users                             admin
/// PUT    /api/v1/users/{id}/role                   admin
/// GET    /api/v1/players[/{id}]                    bearer
/// POST   /api/v1/players                           admin
/// PUT    /api/v1/players/{id}                      admin
/// DELETE /api/v1/players/{id}                      admin
/// GET    /api/v1/tournaments[/{id}]                bearer
/// POST   /api/v1/tournaments                       admin
/// PUT    /api/v1/tournaments/{id}                  admin
/// DELETE /api/v1/tournaments/{id}                  admin
/// GET    /api/v1/tournaments/{id}/registrations    bearer
/// POST   /api/v1/tournament-registration/{id}      player
/// DELETE /api/v1/tournament-registration/{id}      player
/// GET    /api/v1/my-registrations                  player
/// POST   /api/v1/teams                             player
/// GET    /api/v1/teams/{id}                        bearer
/// POST   /api/v1/team-registration/{id}            player
/// DELETE /api/v1/team-registration/{id}            player
/// GET    /api/v1/matches[/{id}]                    bearer
/// POST   /api/v1/matches                           bearer
/// PUT    /api/v1/matches/{id}                      bearer
/// DELETE /api/v1/matches/{id}                      bearer
/// PUT    /api/v1/matches/{id}/winner               bearer
/// ```
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Role checks for admin and player routes run inside the managers
    let protected_routes = Router::new()
        .route("/profile", get(auth::get_profile).put(auth::update_profile))
        .route("/change-password", post(auth::change_password))
        .route("/users", get(users::list_users))
        .route("/users/{id}/role", put(users::update_role))
        .route(
            "/players",
            get(users::list_players).post(users::create_player),
        )
        .route(
            "/players/{id}",
            get(users::get_player)
                .put(users::update_player)
                .delete(users::delete_player),
        )
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/tournaments/{id}",
            get(tournaments::get_tournament)
                .put(tournaments::update_tournament)
                .delete(tournaments::delete_tournament),
        )
        .route(
            "/tournaments/{id}/registrations",
            get(registrations::tournament_registrations),
        )
        .route(
            "/tournament-registration/{id}",
            post(registrations::register_player).delete(registrations::unregister_player),
        )
        .route("/my-registrations", get(registrations::my_registrations))
        .route("/teams", post(teams::create_team))
        .route("/teams/{id}", get(teams::get_team))
        .route(
            "/team-registration/{id}",
            post(registrations::register_team).delete(registrations::withdraw_team),
        )
        .route(
            "/matches",
            get(matches::list_matches).post(matches::create_match),
        )
        .route(
            "/matches/{id}",
            get(matches::get_match)
                .put(matches::update_match)
                .delete(matches::delete_match),
        )
        .route("/matches/{id}/winner", put(matches::set_winner))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// CORS policy allowing one browser origin
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(request_id::REQUEST_ID_HEADER)]))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","database":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.store.health_check().await;

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
