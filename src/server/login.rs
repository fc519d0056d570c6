//! Unprotected helper routes: login redirect and health checks

use axum::{Json, extract::State, response::Redirect};
use serde_json::{Value, json};

use crate::core::error::ApiError;
use crate::server::state::AppState;

/// `GET /`: send the browser to the authority's login page
///
/// Answers `303 See Other`. Without a configured login URL there is nothing
/// to redirect to and the route behaves as unknown.
pub async fn login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.login_url.as_ref().ok_or(ApiError::RouteNotFound)?;
    Ok(Redirect::to(url.as_str()))
}

/// `GET /login-results`: landing page after login
///
/// The token travels in the URL fragment, which never reaches the server.
pub async fn login_results() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "casting-api"
    }))
}
