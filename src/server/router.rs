//! Route table

use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::error::ApiError;
use crate::entities::handlers::{
    create_actor, create_movie, delete_actor, delete_movie, list_actors, list_movies,
    patch_actor, patch_movie,
};
use crate::links::handlers::{
    link_actor_movies, link_movie_actors, unlink_actor_movies, unlink_movie_actors,
};
use crate::server::login::{health_check, login, login_results};
use crate::server::state::AppState;

/// Build entity CRUD routes
///
/// - GET/POST /movies, PATCH/DELETE /movies/{id}
/// - GET/POST /actors, PATCH/DELETE /actors/{id}
pub fn build_entity_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{id}", patch(patch_movie).delete(delete_movie))
        .route("/actors", get(list_actors).post(create_actor))
        .route("/actors/{id}", patch(patch_actor).delete(delete_actor))
}

/// Build association routes
///
/// - POST/DELETE /movies/{id}/actors
/// - POST/DELETE /actors/{id}/movies
pub fn build_link_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movies/{id}/actors",
            axum::routing::post(link_movie_actors).delete(unlink_movie_actors),
        )
        .route(
            "/actors/{id}/movies",
            axum::routing::post(link_actor_movies).delete(unlink_actor_movies),
        )
}

/// Build login and health check routes
pub fn build_helper_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login))
        .route("/login-results", get(login_results))
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Full application router with tracing and CORS
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(build_helper_routes())
        .merge(build_entity_routes())
        .merge(build_link_routes())
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
