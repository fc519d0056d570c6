//! Association routes and management between movies and actors

pub mod handlers;
pub mod manager;

pub use handlers::LinkIds;
pub use manager::AssociationManager;
