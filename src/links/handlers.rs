//! HTTP handlers for association operations
//!
//! Each handler answers with the parent's full view:
//! `{"success": true, "movie": {..., "actors": [...]}}` or the actor equivalent.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::auth::{DeleteActorsMovies, DeleteMoviesActors, PostActorsMovies, PostMoviesActors};
use crate::core::error::ApiError;
use crate::core::extractors::{EntityId, Guarded};
use crate::core::link::Side;
use crate::core::validation::{Payload, Require};
use crate::server::state::AppState;

/// Body of every association route: the ids of the other side
#[derive(Debug, Clone, Deserialize)]
pub struct LinkIds {
    pub ids: Vec<i64>,
}

impl Payload for LinkIds {
    const FIELDS: &'static [&'static str] = &["ids"];
    const REQUIRE: Require = Require::All;
}

/// `POST /movies/{id}/actors`
pub async fn link_movie_actors(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guarded: Guarded<PostMoviesActors, LinkIds>,
) -> Result<Json<Value>, ApiError> {
    let manager = state.manager();
    manager.link(Side::Movie, id, &guarded.payload.ids).await?;
    let movie = manager.movie_view(id).await?;

    Ok(Json(json!({ "success": true, "movie": movie })))
}

/// `DELETE /movies/{id}/actors`
pub async fn unlink_movie_actors(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guarded: Guarded<DeleteMoviesActors, LinkIds>,
) -> Result<Json<Value>, ApiError> {
    let manager = state.manager();
    manager.unlink(Side::Movie, id, &guarded.payload.ids).await?;
    let movie = manager.movie_view(id).await?;

    Ok(Json(json!({ "success": true, "movie": movie })))
}

/// `POST /actors/{id}/movies`
pub async fn link_actor_movies(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guarded: Guarded<PostActorsMovies, LinkIds>,
) -> Result<Json<Value>, ApiError> {
    let manager = state.manager();
    manager.link(Side::Actor, id, &guarded.payload.ids).await?;
    let actor = manager.actor_view(id).await?;

    Ok(Json(json!({ "success": true, "actor": actor })))
}

/// `DELETE /actors/{id}/movies`
pub async fn unlink_actor_movies(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guarded: Guarded<DeleteActorsMovies, LinkIds>,
) -> Result<Json<Value>, ApiError> {
    let manager = state.manager();
    manager.unlink(Side::Actor, id, &guarded.payload.ids).await?;
    let actor = manager.actor_view(id).await?;

    Ok(Json(json!({ "success": true, "actor": actor })))
}
