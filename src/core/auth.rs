//! Permission-based authorization
//!
//! Callers present an externally issued bearer token. The token is verified by
//! a [`TokenVerifier`](crate::core::token::TokenVerifier) and the resulting
//! [`Claims`] must carry the permission named by the route, e.g. `get:movies`.
//!
//! Permissions are declared as zero-sized marker types so a handler states its
//! requirement in its signature:
//!
//! ```rust,ignore
//! async fn list_movies(_: Authorized<GetMovies>, State(state): State<AppState>) { .. }
//! ```

use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authorization failures
///
/// All variants surface as `401 Unauthorized` with a `{code, description}` body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Authorization header is expected.")]
    HeaderMissing,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    MalformedHeader(&'static str),

    /// Token header unreadable, unsupported algorithm, or no matching key
    #[error("{0}")]
    InvalidHeader(String),

    /// `exp` is in the past
    #[error("Token expired.")]
    TokenExpired,

    /// Signature, audience, issuer or claim shape rejected
    #[error("{0}")]
    InvalidClaims(String),

    /// Token is valid but lacks the required permission
    #[error("Permission not found.")]
    UnauthorizedScope,
}

/// `{code, description}` pair sent to clients
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthErrorBody {
    pub code: &'static str,
    pub description: String,
}

impl AuthError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "authorization_header_missing",
            AuthError::MalformedHeader(_) | AuthError::InvalidHeader(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::UnauthorizedScope => "unauthorized",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn body(&self) -> AuthErrorBody {
        AuthErrorBody {
            code: self.code(),
            description: self.to_string(),
        }
    }
}

/// Claims of a verified access token
///
/// Only the fields the API reads are typed; issuer, audience and expiry are
/// checked by the verifier against the raw token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the caller's identity at the authority)
    #[serde(default)]
    pub sub: Option<String>,

    /// Granted permissions; `None` when the token has no `permissions` claim
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl Claims {
    /// Check that the claim set grants `permission` (exact, case-sensitive)
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        let Some(permissions) = &self.permissions else {
            return Err(AuthError::InvalidClaims(
                "Permissions not included in JWT.".to_string(),
            ));
        };

        if permissions.iter().any(|p| p == permission) {
            Ok(())
        } else {
            Err(AuthError::UnauthorizedScope)
        }
    }
}

/// A named permission a route requires
pub trait Permission: Send + Sync + 'static {
    const NAME: &'static str;
}

/// Declare permission marker types
///
/// ```rust,ignore
/// permission!(GetMovies, "get:movies");
/// ```
#[macro_export]
macro_rules! permission {
    ($name:ident, $value:literal) => {
        #[doc = concat!("Requires the `", $value, "` permission")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl $crate::core::auth::Permission for $name {
            const NAME: &'static str = $value;
        }
    };
}

permission!(GetMovies, "get:movies");
permission!(PostMovies, "post:movies");
permission!(PatchMovies, "patch:movies");
permission!(DeleteMovies, "delete:movies");
permission!(GetActors, "get:actors");
permission!(PostActors, "post:actors");
permission!(PatchActors, "patch:actors");
permission!(DeleteActors, "delete:actors");
permission!(PostMoviesActors, "post:movies_actors");
permission!(DeleteMoviesActors, "delete:movies_actors");
permission!(PostActorsMovies, "post:actors_movies");
permission!(DeleteActorsMovies, "delete:actors_movies");

/// Extract the raw token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::HeaderMissing)?;
    let value = value.to_str().map_err(|_| {
        AuthError::MalformedHeader("Authorization header must be bearer token.")
    })?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        )),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(
            AuthError::MalformedHeader("Authorization header must start with \"Bearer\"."),
        ),
        [_] => Err(AuthError::MalformedHeader("Token not found.")),
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        )),
    }
}
