//! Movie and actor entities with their CRUD routes

pub mod actor;
pub mod handlers;
pub mod macros;
pub mod movie;

pub use actor::{Actor, ActorCreate, ActorPatch, ActorView, NewActor};
pub use movie::{Movie, MovieCreate, MoviePatch, MovieView, NewMovie, parse_release_date};
