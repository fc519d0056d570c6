//! Axum extractors guarding handlers
//!
//! This module provides HTTP extractors that automatically:
//! - Verify the bearer token and check the route's permission
//! - Validate the JSON payload before the permission check
//! - Parse integer path ids
//!
//! A handler lists what it needs in its signature and only runs once every
//! extractor succeeded:
//!
//! ```rust,ignore
//! async fn patch_movie(
//!     EntityId(id): EntityId,
//!     State(state): State<AppState>,
//!     guarded: Guarded<PatchMovies, MoviePatch>,
//! ) -> Result<Json<Value>, ApiError> { .. }
//! ```

use axum::extract::{FromRef, FromRequest, FromRequestParts, Path, Request};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::auth::{AuthError, Claims, Permission, bearer_token};
use crate::core::error::ApiError;
use crate::core::token::TokenVerifier;
use crate::core::validation::{Payload, ValidJson};

/// Verify the request's bearer token and check `permission`
pub async fn authorize(
    headers: &HeaderMap,
    verifier: &dyn TokenVerifier,
    permission: &str,
) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?;
    let claims = verifier.verify(token).await?;
    claims.require(permission)?;
    Ok(claims)
}

/// Permission guard for routes without a payload
#[derive(Debug, Clone)]
pub struct Authorized<P: Permission> {
    pub claims: Claims,
    _permission: PhantomData<P>,
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: Permission,
    Arc<dyn TokenVerifier>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<dyn TokenVerifier>::from_ref(state);
        let claims = authorize(&parts.headers, verifier.as_ref(), P::NAME).await?;

        Ok(Self {
            claims,
            _permission: PhantomData,
        })
    }
}

/// Payload validation followed by the permission guard
///
/// The body is checked first: a malformed payload is rejected with 415/422
/// even when the token would also have been refused.
#[derive(Debug)]
pub struct Guarded<P: Permission, T> {
    pub claims: Claims,
    pub payload: T,
    _permission: PhantomData<P>,
}

impl<P: Permission, T> Guarded<P, T> {
    /// Get the validated payload
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<S, P, T> FromRequest<S> for Guarded<P, T>
where
    S: Send + Sync,
    P: Permission,
    T: Payload,
    Arc<dyn TokenVerifier>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let ValidJson(payload) = ValidJson::<T>::from_request(req, state).await?;

        let verifier = Arc::<dyn TokenVerifier>::from_ref(state);
        let claims = authorize(&headers, verifier.as_ref(), P::NAME).await?;

        Ok(Self {
            claims,
            payload,
            _permission: PhantomData,
        })
    }
}

/// Integer id from the `{id}` path segment
///
/// A segment that is not an integer means no resource matches: 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::RouteNotFound)?;
        Ok(EntityId(id))
    }
}
