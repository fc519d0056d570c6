//! Server module wiring handlers, state and middleware
//!
//! This module provides a `ServerBuilder` that registers:
//! - CRUD routes for movies and actors
//! - Association routes in both directions
//! - Login redirect and health check routes

pub mod builder;
pub mod login;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::AppState;
