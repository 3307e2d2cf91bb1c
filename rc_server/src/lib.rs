//! HTTP front end for the racquet club backend.
//!
//! The binary in `main.rs` loads [`config::ServerConfig`], initializes
//! [`logging`], connects the store and serves [`api::create_router`].

pub mod api;
pub mod config;
pub mod logging;
