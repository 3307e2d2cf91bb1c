//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use racquet_club::ClubServices;
use racquet_club::auth::{NewUser, Role, User};
use racquet_club::db::{MemoryStore, UserRepository};
use racquet_club::tournament::{NewTournament, Tournament};
use std::sync::Arc;

pub const PEPPER: &str = "integration_test_pepper";
pub const JWT_SECRET: &str = "integration_test_jwt_secret_0123456789";

/// Services over a fresh in-memory store
pub fn memory_services() -> (Arc<MemoryStore>, ClubServices) {
    let store = Arc::new(MemoryStore::new());
    let services = ClubServices::new(store.clone(), PEPPER.to_string(), JWT_SECRET.to_string());
    (store, services)
}

/// Insert a user directly, skipping password hashing
pub async fn insert_user<S: UserRepository + ?Sized>(store: &S, username: &str, role: Role) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@club.test"),
            password_hash: "not-a-real-hash".to_string(),
            full_name: username.to_string(),
            role,
            ranking: 0,
        })
        .await
        .expect("user insert should succeed")
}

pub async fn singles(services: &ClubServices, admin: &User, max_players: i32) -> Tournament {
    let mut request = NewTournament::singles("Club Singles");
    request.max_players = max_players;
    services
        .tournaments
        .create_tournament(admin, request)
        .await
        .expect("tournament creation should succeed")
        .tournament
}

pub async fn doubles(services: &ClubServices, admin: &User, max_teams: i32) -> Tournament {
    let mut request = NewTournament::doubles("Club Doubles");
    request.max_teams = max_teams;
    services
        .tournaments
        .create_tournament(admin, request)
        .await
        .expect("tournament creation should succeed")
        .tournament
}
