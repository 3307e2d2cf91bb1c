//! Registration engine.
//!
//! Enrolls individual players and teams into tournaments while keeping
//! three invariants: registrations only while the tournament is upcoming,
//! at most one active registration per entrant, and never more active
//! registrations than the tournament's capacity. Registrations are
//! withdrawn rather than deleted.
//!
//! The checks live in [`rules`]; each store runs them inside one atomic
//! unit together with the insert.

pub mod errors;
pub mod manager;
pub mod models;
pub mod rules;

pub use errors::{RegistrationError, RegistrationResult};
pub use manager::RegistrationManager;
pub use models::{
    PlayerRegistration, PlayerRegistrationDetail, RegistrationId, RegistrationStatus,
    TeamRegistration, TournamentRegistrations,
};
