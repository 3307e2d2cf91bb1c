//! Identity, credentials and role gates.
//!
//! - Argon2id password hashing with a server-side pepper
//! - HS256 JWT access tokens carrying the user id and role
//! - Role predicates ([`require_admin`], [`require_player`]) evaluated
//!   against the user record loaded at request time
//!
//! ## Example
//!
//! ```no_run
//! use racquet_club::auth::{AuthManager, RegisterRequest};
//! use racquet_club::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryStore::new()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!     );
//!
//!     let session = auth
//!         .register(RegisterRequest {
//!             username: "player1".to_string(),
//!             email: "player1@example.com".to_string(),
//!             password: "secret1".to_string(),
//!             full_name: "Player One".to_string(),
//!         })
//!         .await?;
//!     println!("Registered user: {}", session.user.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod gate;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use gate::{require_admin, require_player};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, AuthSession, LoginRequest, NewPlayerRequest, NewUser, PlayerUpdate,
    ProfileUpdate, RegisterRequest, Role, User, UserId, UserRecord,
};
