//! Tournament registry.
//!
//! Tournaments are created by admins, who become their immutable owner.
//! The status field is free-form: any status can be set at any time, and
//! only `upcoming` tournaments accept registrations.
//!
//! ## Example
//!
//! ```no_run
//! use racquet_club::db::MemoryStore;
//! use racquet_club::tournament::{NewTournament, TournamentManager};
//! # use racquet_club::auth::User;
//! use std::sync::Arc;
//!
//! # async fn example(admin: User) -> Result<(), Box<dyn std::error::Error>> {
//! let tournaments = TournamentManager::new(Arc::new(MemoryStore::new()));
//! let info = tournaments
//!     .create_tournament(&admin, NewTournament::doubles("Autumn Doubles"))
//!     .await?;
//! println!("Created tournament {} with room for {} teams", info.tournament.id, info.capacity);
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod models;

pub use manager::{TournamentError, TournamentManager, TournamentResult};
pub use models::{
    DEFAULT_MAX_PLAYERS, DEFAULT_MAX_TEAMS, NewTournament, RegistrationCounts, Tournament,
    TournamentId, TournamentInfo, TournamentStatus, TournamentType, TournamentUpdate,
};
