//! HTTP handlers for movie and actor CRUD

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::core::auth::{
    DeleteActors, DeleteMovies, GetActors, GetMovies, PatchActors, PatchMovies, PostActors,
    PostMovies,
};
use crate::core::error::ApiError;
use crate::core::extractors::{Authorized, EntityId, Guarded};
use crate::entities::actor::{ActorCreate, ActorPatch};
use crate::entities::movie::{MovieCreate, MoviePatch};
use crate::server::state::AppState;

/// `GET /movies`
pub async fn list_movies(
    _: Authorized<GetMovies>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let manager = state.manager();
    let mut movies = Vec::new();
    for movie in state.movies.list().await? {
        movies.push(manager.expand_movie(movie).await?);
    }

    Ok(Json(json!({ "success": true, "movies": movies })))
}

/// `POST /movies`
pub async fn create_movie(
    State(state): State<AppState>,
    guarded: Guarded<PostMovies, MovieCreate>,
) -> Result<Json<Value>, ApiError> {
    let draft = guarded.into_payload().into_draft()?;
    let movie = state.movies.create(draft).await?;
    tracing::info!(id = movie.id, "movie created");
    let movie = state.manager().expand_movie(movie).await?;

    Ok(Json(json!({ "success": true, "movie": movie })))
}

/// `PATCH /movies/{id}`
pub async fn patch_movie(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guarded: Guarded<PatchMovies, MoviePatch>,
) -> Result<Json<Value>, ApiError> {
    let not_found = || ApiError::NotFound {
        entity_type: "movie",
        id,
    };

    let movie = state.movies.get(id).await?.ok_or_else(not_found)?;
    let movie = guarded.into_payload().apply(movie)?;
    let movie = state.movies.update(movie).await?.ok_or_else(not_found)?;
    let movie = state.manager().expand_movie(movie).await?;

    Ok(Json(json!({ "success": true, "movie": movie })))
}

/// `DELETE /movies/{id}`
pub async fn delete_movie(
    EntityId(id): EntityId,
    _: Authorized<DeleteMovies>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    if !state.movies.delete(id).await? {
        return Err(ApiError::NotFound {
            entity_type: "movie",
            id,
        });
    }
    tracing::info!(id, "movie deleted");

    Ok(Json(json!({ "success": true, "delete": id })))
}

/// `GET /actors`
pub async fn list_actors(
    _: Authorized<GetActors>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let manager = state.manager();
    let mut actors = Vec::new();
    for actor in state.actors.list().await? {
        actors.push(manager.expand_actor(actor).await?);
    }

    Ok(Json(json!({ "success": true, "actors": actors })))
}

/// `POST /actors`
pub async fn create_actor(
    State(state): State<AppState>,
    guarded: Guarded<PostActors, ActorCreate>,
) -> Result<Json<Value>, ApiError> {
    let draft = guarded.into_payload().into_draft()?;
    let actor = state.actors.create(draft).await?;
    tracing::info!(id = actor.id, "actor created");
    let actor = state.manager().expand_actor(actor).await?;

    Ok(Json(json!({ "success": true, "actor": actor })))
}

/// `PATCH /actors/{id}`
pub async fn patch_actor(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guarded: Guarded<PatchActors, ActorPatch>,
) -> Result<Json<Value>, ApiError> {
    let not_found = || ApiError::NotFound {
        entity_type: "actor",
        id,
    };

    let actor = state.actors.get(id).await?.ok_or_else(not_found)?;
    let actor = guarded.into_payload().apply(actor)?;
    let actor = state.actors.update(actor).await?.ok_or_else(not_found)?;
    let actor = state.manager().expand_actor(actor).await?;

    Ok(Json(json!({ "success": true, "actor": actor })))
}

/// `DELETE /actors/{id}`
pub async fn delete_actor(
    EntityId(id): EntityId,
    _: Authorized<DeleteActors>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    if !state.actors.delete(id).await? {
        return Err(ApiError::NotFound {
            entity_type: "actor",
            id,
        });
    }
    tracing::info!(id, "actor deleted");

    Ok(Json(json!({ "success": true, "delete": id })))
}
