//! # Casting API
//!
//! A REST API managing movies, actors and the casting links between them,
//! guarded by permissions carried in externally issued bearer tokens.
//!
//! ## Features
//!
//! - **Permission Guard**: every route names one permission (`get:movies`, `post:actors_movies`, ...)
//!   that the caller's verified token must carry
//! - **Token Verification**: RS256 JWTs checked against the authority's JWKS, cached with a TTL
//! - **Request Validation**: JSON payloads checked for required keys and types before handlers run
//! - **Many-to-Many Associations**: idempotent, atomic link and unlink batches in both directions
//! - **Pluggable Storage**: in-memory store, or PostgreSQL behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use casting::prelude::*;
//!
//! let config = AppConfig::load(None)?;
//!
//! ServerBuilder::from_config(&config)?
//!     .with_store(InMemoryStore::new())
//!     .serve(&config.bind_address)
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod links;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiError, Association, AssociationService, AuthError, Authorized, Claims, DataService,
        Entity, EntityId, Field, Guarded, JwtVerifier, KeySource, Payload, Permission, Require,
        Side, TokenVerifier, ValidJson, auth,
    };

    // === Entities ===
    pub use crate::entities::{
        Actor, ActorCreate, ActorPatch, ActorView, Movie, MovieCreate, MoviePatch, MovieView,
        NewActor, NewMovie,
    };

    // === Associations ===
    pub use crate::links::{AssociationManager, LinkIds};

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::{AppConfig, AuthConfig, ConfigError};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder, build_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
}
