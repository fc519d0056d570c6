//! Axum extractor for validated payloads
//!
//! This module provides the `ValidJson<T>` extractor that rejects a request
//! before it reaches the handler when its body is not a usable `T`.

use super::Payload;
use crate::core::error::ApiError;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;

/// Axum extractor that checks and deserializes a JSON payload
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_movie(
///     ValidJson(payload): ValidJson<MovieCreate>,
/// ) -> Result<Json<Value>, ApiError> {
///     // payload has every required key and the right types
/// }
/// ```
///
/// Rejections:
/// - body not declared or not parseable as JSON: `415`
/// - body over the size limit: `413`
/// - required keys missing: `422`
/// - a key has the wrong type: `422`
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<T> ValidJson<T> {
    /// Get the inner payload
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for ValidJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::BytesRejection(inner) if inner.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::PayloadTooLarge(inner.body_text())
        }
        JsonRejection::BytesRejection(inner) => ApiError::Internal(inner.body_text()),
        other => ApiError::UnsupportedMediaType(other.body_text()),
    }
}

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Payload,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(reject_body)?;

        if !T::REQUIRE.check(&body, T::FIELDS) {
            return Err(ApiError::unprocessable(T::REQUIRE.describe(T::FIELDS)));
        }

        serde_json::from_value(body)
            .map(ValidJson)
            .map_err(|e| ApiError::unprocessable(e.to_string()))
    }
}
