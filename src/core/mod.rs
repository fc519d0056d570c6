//! Core module containing the traits and types shared by every route

pub mod auth;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod field;
pub mod jwks;
pub mod link;
pub mod service;
pub mod token;
pub mod validation;

pub use auth::{AuthError, Claims, Permission};
pub use entity::Entity;
pub use error::ApiError;
pub use extractors::{Authorized, EntityId, Guarded};
pub use field::Field;
pub use jwks::KeySource;
pub use link::{Association, Side};
pub use service::{AssociationService, DataService};
pub use token::{JwtVerifier, TokenVerifier};
pub use validation::{Payload, Require, ValidJson};
