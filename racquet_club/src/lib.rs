//! # Racquet Club
//!
//! Tournament, team and match management for a racquet-sport club.
//!
//! ## Architecture
//!
//! Components, in dependency order:
//!
//! - [`auth`]: accounts, Argon2 password hashing, JWT access tokens and the
//!   role gates every mutation passes through
//! - [`tournament`]: tournament lifecycle and capacity
//! - [`registration`]: admission of players and teams under capacity,
//!   duplicate and singles/doubles rules
//! - [`team`]: two-player teams
//! - [`matches`]: match records and winners
//! - [`db`]: repository traits with PostgreSQL and in-memory stores
//!
//! Managers receive their storage explicitly; there is no global state.
//!
//! ## Example
//!
//! ```no_run
//! use racquet_club::ClubServices;
//! use racquet_club::db::MemoryStore;
//! use std::sync::Arc;
//!
//! let services = ClubServices::new(
//!     Arc::new(MemoryStore::new()),
//!     "pepper".to_string(),
//!     "jwt_secret".to_string(),
//! );
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod matches;
pub mod registration;
pub mod team;
pub mod tournament;

pub use error::{ClassifiedError, ErrorKind};

use auth::AuthManager;
use db::Store;
use matches::MatchManager;
use registration::RegistrationManager;
use std::sync::Arc;
use team::TeamManager;
use tournament::TournamentManager;

/// Every manager wired to one shared store
#[derive(Clone)]
pub struct ClubServices {
    pub auth: AuthManager,
    pub tournaments: TournamentManager,
    pub registrations: RegistrationManager,
    pub teams: TeamManager,
    pub matches: MatchManager,
}

impl ClubServices {
    pub fn new<S: Store + 'static>(store: Arc<S>, pepper: String, jwt_secret: String) -> Self {
        Self {
            auth: AuthManager::new(store.clone(), pepper, jwt_secret),
            tournaments: TournamentManager::new(store.clone()),
            registrations: RegistrationManager::new(store.clone()),
            teams: TeamManager::new(store.clone(), store.clone()),
            matches: MatchManager::new(store),
        }
    }
}
