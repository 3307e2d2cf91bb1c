//! HTTP-level tests driving the router with `oneshot` over the in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use racquet_club::ClubServices;
use racquet_club::auth::Role;
use racquet_club::db::{MemoryStore, UserRepository};
use rc_server::api::{AppState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method
use tower_http::cors::CorsLayer;

const PEPPER: &str = "test_pepper_for_testing_only";
const JWT_SECRET: &str = "test_secret_key_for_testing_only_0123456789";

struct TestApp {
    app: Router,
    store: Arc<MemoryStore>,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState {
            services: ClubServices::new(store.clone(), PEPPER.to_string(), JWT_SECRET.to_string()),
            store: store.clone(),
        };
        Self {
            app: create_router(state, CorsLayer::permissive()),
            store,
        }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    /// Register a player over HTTP, returning its id and token
    async fn register(&self, username: &str) -> (i64, String) {
        let reply = self
            .send(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@club.test"),
                    "password": "secret1",
                    "full_name": username,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        let data = &reply.body["data"];
        (
            data["user"]["id"].as_i64().unwrap(),
            data["token"].as_str().unwrap().to_string(),
        )
    }

    /// Register an account and promote it to admin directly in the store
    async fn admin(&self, username: &str) -> String {
        let (id, token) = self.register(username).await;
        let mut user = self.store.find_by_id(id).await.unwrap().unwrap();
        user.role = Role::Admin;
        self.store.save_user(&user).await.unwrap();
        token
    }

    async fn create_tournament(&self, admin_token: &str, body: Value) -> i64 {
        let reply = self
            .send(Method::POST, "/api/v1/tournaments", Some(admin_token), Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["data"]["id"].as_i64().unwrap()
    }
}

// ============================================================================
// Health and plumbing
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = TestApp::new();
    let reply = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "healthy");
    assert_eq!(reply.body["database"], true);
    assert!(reply.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid_body");
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new();
    let (id, _) = app.register("ana").await;

    for login in ["ana", "ana@club.test"] {
        let reply = app
            .send(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "login": login, "password": "secret1" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["message"], "Login successful");
        assert_eq!(reply.body["data"]["user"]["id"], id);
        assert_eq!(reply.body["data"]["user"]["role"], "player");
        assert!(reply.body["data"]["user"].get("password_hash").is_none());
    }
}

#[tokio::test]
async fn test_invalid_login_returns_generic_error() {
    let app = TestApp::new();
    app.register("ana").await;

    let wrong_password = app
        .send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "username": "ana", "password": "nope123" })),
        )
        .await;
    let unknown_user = app
        .send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "username": "ghost", "password": "nope123" })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(wrong_password.body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.register("ana").await;

    let reply = app
        .send(
            Method::POST,
            "/api/v1/register",
            None,
            Some(json!({
                "username": "ana",
                "email": "other@club.test",
                "password": "secret1",
                "full_name": "Other",
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["error"], "username_taken");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let missing = app.send(Method::GET, "/api/v1/tournaments", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "missing_token");

    let garbage = app
        .send(Method::GET, "/api/v1/tournaments", Some("not-a-jwt"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.body["error"], "invalid_token");
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let app = TestApp::new();
    let (_, token) = app.register("ana").await;

    let updated = app
        .send(
            Method::PUT,
            "/api/v1/profile",
            Some(&token),
            Some(json!({ "full_name": "Ana Maria", "ranking": 7 })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["full_name"], "Ana Maria");
    assert_eq!(updated.body["data"]["ranking"], 7);

    let wrong_current = app
        .send(
            Method::POST,
            "/api/v1/change-password",
            Some(&token),
            Some(json!({ "current_password": "bad", "new_password": "secret2" })),
        )
        .await;
    assert_eq!(wrong_current.status, StatusCode::BAD_REQUEST);

    let changed = app
        .send(
            Method::POST,
            "/api/v1/change-password",
            Some(&token),
            Some(json!({ "current_password": "secret1", "new_password": "secret2" })),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert!(changed.body.get("data").is_none());

    let login = app
        .send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "login": "ana", "password": "secret2" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[tokio::test]
async fn test_role_change_applies_to_existing_token() {
    let app = TestApp::new();
    let admin = app.admin("root").await;
    let (player_id, player_token) = app.register("ana").await;

    let forbidden = app
        .send(Method::GET, "/api/v1/users", Some(&player_token), None)
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["error"], "admin_required");

    let promoted = app
        .send(
            Method::PUT,
            &format!("/api/v1/users/{player_id}/role"),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);

    let users = app
        .send(Method::GET, "/api/v1/users", Some(&player_token), None)
        .await;
    assert_eq!(users.status, StatusCode::OK);
    assert_eq!(users.body["data"].as_array().unwrap().len(), 2);

    let invalid = app
        .send(
            Method::PUT,
            &format!("/api/v1/users/{player_id}/role"),
            Some(&admin),
            Some(json!({ "role": "owner" })),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Tournaments and registrations
// ============================================================================

#[tokio::test]
async fn test_player_cannot_create_tournament() {
    let app = TestApp::new();
    let (_, token) = app.register("ana").await;

    let reply = app
        .send(
            Method::POST,
            "/api/v1/tournaments",
            Some(&token),
            Some(json!({ "name": "Sneaky Cup" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_capacity_scenario_over_http() {
    let app = TestApp::new();
    let admin = app.admin("root").await;
    let tournament_id = app
        .create_tournament(&admin, json!({ "name": "Spring Open", "max_players": 2 }))
        .await;

    let (_, p1) = app.register("p1").await;
    let (_, p2) = app.register("p2").await;
    let (_, p3) = app.register("p3").await;
    let path = format!("/api/v1/tournament-registration/{tournament_id}");

    assert_eq!(app.send(Method::POST, &path, Some(&p1), None).await.status, StatusCode::CREATED);
    assert_eq!(app.send(Method::POST, &path, Some(&p2), None).await.status, StatusCode::CREATED);

    let full = app.send(Method::POST, &path, Some(&p3), None).await;
    assert_eq!(full.status, StatusCode::CONFLICT);
    assert_eq!(full.body["error"], "tournament_full");

    let duplicate = app.send(Method::POST, &path, Some(&p1), None).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["error"], "already_registered");

    assert_eq!(app.send(Method::DELETE, &path, Some(&p1), None).await.status, StatusCode::OK);
    assert_eq!(app.send(Method::POST, &path, Some(&p3), None).await.status, StatusCode::CREATED);

    let info = app
        .send(
            Method::GET,
            &format!("/api/v1/tournaments/{tournament_id}"),
            Some(&p1),
            None,
        )
        .await;
    assert_eq!(info.body["data"]["registered_players"], 2);
    assert_eq!(info.body["data"]["capacity"], 2);

    let mine = app
        .send(Method::GET, "/api/v1/my-registrations", Some(&p3), None)
        .await;
    assert_eq!(mine.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(mine.body["data"][0]["tournament"]["name"], "Spring Open");

    let listed = app
        .send(
            Method::GET,
            &format!("/api/v1/tournaments/{tournament_id}/registrations"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(listed.body["data"]["players"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_cannot_register_as_player() {
    let app = TestApp::new();
    let admin = app.admin("root").await;
    let tournament_id = app
        .create_tournament(&admin, json!({ "name": "Open" }))
        .await;

    let reply = app
        .send(
            Method::POST,
            &format!("/api/v1/tournament-registration/{tournament_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["error"], "player_required");
}

#[tokio::test]
async fn test_registration_closed_and_missing_tournament() {
    let app = TestApp::new();
    let admin = app.admin("root").await;
    let (_, player) = app.register("ana").await;
    let tournament_id = app
        .create_tournament(&admin, json!({ "name": "Open" }))
        .await;

    let started = app
        .send(
            Method::PUT,
            &format!("/api/v1/tournaments/{tournament_id}"),
            Some(&admin),
            Some(json!({ "status": "ongoing" })),
        )
        .await;
    assert_eq!(started.status, StatusCode::OK);
    assert_eq!(started.body["data"]["status"], "ongoing");

    let closed = app
        .send(
            Method::POST,
            &format!("/api/v1/tournament-registration/{tournament_id}"),
            Some(&player),
            None,
        )
        .await;
    assert_eq!(closed.status, StatusCode::BAD_REQUEST);
    assert_eq!(closed.body["error"], "registration_closed");

    let missing = app
        .send(Method::POST, "/api/v1/tournament-registration/999", Some(&player), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let bad_path = app
        .send(Method::POST, "/api/v1/tournament-registration/abc", Some(&player), None)
        .await;
    assert_eq!(bad_path.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_path.body["error"], "invalid_path");
}

#[tokio::test]
async fn test_team_flow_over_http() {
    let app = TestApp::new();
    let admin = app.admin("root").await;
    let (p1_id, p1) = app.register("p1").await;
    let (p2_id, p2) = app.register("p2").await;
    let doubles = app
        .create_tournament(&admin, json!({ "name": "Doubles", "type": "doubles" }))
        .await;
    let singles = app
        .create_tournament(&admin, json!({ "name": "Singles" }))
        .await;

    let team = app
        .send(
            Method::POST,
            "/api/v1/teams",
            Some(&p1),
            Some(json!({ "name": "Smashers", "partner_id": p2_id })),
        )
        .await;
    assert_eq!(team.status, StatusCode::CREATED, "{}", team.body);
    let team_id = team.body["data"]["id"].as_i64().unwrap();
    let members = team.body["data"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    let captain = members.iter().find(|m| m["role"] == "captain").unwrap();
    assert_eq!(captain["player_id"], p1_id);

    let path = format!("/api/v1/team-registration/{doubles}");
    let registered = app
        .send(Method::POST, &path, Some(&p2), Some(json!({ "team_id": team_id })))
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);

    let duplicate = app
        .send(Method::POST, &path, Some(&p1), Some(json!({ "team_id": team_id })))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["error"], "team_already_registered");

    let wrong_type = app
        .send(
            Method::POST,
            &format!("/api/v1/team-registration/{singles}"),
            Some(&p1),
            Some(json!({ "team_id": team_id })),
        )
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.body["error"], "singles_tournament");

    let (_, outsider) = app.register("p3").await;
    let not_member = app
        .send(Method::DELETE, &path, Some(&outsider), Some(json!({ "team_id": team_id })))
        .await;
    assert_eq!(not_member.status, StatusCode::FORBIDDEN);

    let withdrawn = app
        .send(Method::DELETE, &path, Some(&p1), Some(json!({ "team_id": team_id })))
        .await;
    assert_eq!(withdrawn.status, StatusCode::OK);
    assert_eq!(withdrawn.body["data"]["status"], "withdrawn");
}

#[tokio::test]
async fn test_team_with_self_as_partner_is_rejected() {
    let app = TestApp::new();
    let (p1_id, p1) = app.register("p1").await;

    let reply = app
        .send(
            Method::POST,
            "/api/v1/teams",
            Some(&p1),
            Some(json!({ "name": "Solo", "partner_id": p1_id })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Matches and players
// ============================================================================

#[tokio::test]
async fn test_match_lifecycle() {
    let app = TestApp::new();
    let (p1_id, p1) = app.register("p1").await;
    let (p2_id, _) = app.register("p2").await;

    let created = app
        .send(
            Method::POST,
            "/api/v1/matches",
            Some(&p1),
            Some(json!({ "player1_id": p1_id, "player2_id": p2_id, "round": "final" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["status"], "pending");
    let match_id = created.body["data"]["id"].as_i64().unwrap();

    let missing_winner = app
        .send(
            Method::PUT,
            &format!("/api/v1/matches/{match_id}/winner"),
            Some(&p1),
            Some(json!({ "team_id": 4 })),
        )
        .await;
    assert_eq!(missing_winner.status, StatusCode::BAD_REQUEST);

    let unknown_winner = app
        .send(
            Method::PUT,
            &format!("/api/v1/matches/{match_id}/winner"),
            Some(&p1),
            Some(json!({ "player_id": 9999 })),
        )
        .await;
    assert_eq!(unknown_winner.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_winner.body["error"], "invalid_input");

    let dangling = app
        .send(
            Method::POST,
            "/api/v1/matches",
            Some(&p1),
            Some(json!({ "player1_id": p1_id, "player2_id": 9999 })),
        )
        .await;
    assert_eq!(dangling.status, StatusCode::BAD_REQUEST);

    let won = app
        .send(
            Method::PUT,
            &format!("/api/v1/matches/{match_id}/winner"),
            Some(&p1),
            Some(json!({ "player_id": p2_id })),
        )
        .await;
    assert_eq!(won.status, StatusCode::OK);
    assert_eq!(won.body["data"]["status"], "completed");
    assert_eq!(won.body["data"]["winner_player_id"], p2_id);

    let deleted = app
        .send(Method::DELETE, &format!("/api/v1/matches/{match_id}"), Some(&p1), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .send(Method::GET, &format!("/api/v1/matches/{match_id}"), Some(&p1), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["error"], "match_not_found");
}

#[tokio::test]
async fn test_player_directory() {
    let app = TestApp::new();
    let admin = app.admin("root").await;
    let (_, player) = app.register("ana").await;

    let created = app
        .send(
            Method::POST,
            "/api/v1/players",
            Some(&admin),
            Some(json!({
                "username": "ben",
                "email": "ben@club.test",
                "password": "secret1",
                "full_name": "Ben",
                "ranking": 3,
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let ben_id = created.body["data"]["id"].as_i64().unwrap();

    let listed = app.send(Method::GET, "/api/v1/players", Some(&player), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 2);

    let by_player = app
        .send(Method::DELETE, &format!("/api/v1/players/{ben_id}"), Some(&player), None)
        .await;
    assert_eq!(by_player.status, StatusCode::FORBIDDEN);

    let by_admin = app
        .send(Method::DELETE, &format!("/api/v1/players/{ben_id}"), Some(&admin), None)
        .await;
    assert_eq!(by_admin.status, StatusCode::OK);

    let gone = app
        .send(Method::GET, &format!("/api/v1/players/{ben_id}"), Some(&player), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
