//! Typed error handling for the casting API
//!
//! Every handler returns `Result<_, ApiError>`. The error is raised where the
//! failure is detected and converted into the JSON envelope at the boundary:
//!
//! ```json
//! { "success": false, "error": { "code": 404, "message": "Resource not found" } }
//! ```
//!
//! Authorization failures keep the `{code, description}` shape produced by
//! [`AuthError`]:
//!
//! ```json
//! { "success": false, "error": { "code": "token_expired", "description": "Token expired." } }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

use crate::core::auth::{AuthError, AuthErrorBody};

/// The error type returned by every casting handler
#[derive(Debug)]
pub enum ApiError {
    /// Bearer token missing, invalid, or lacking the required permission
    Auth(AuthError),

    /// Entity id does not resolve
    NotFound { entity_type: &'static str, id: i64 },

    /// No route matches, or the path id is not an integer
    RouteNotFound,

    /// Body is not JSON
    UnsupportedMediaType(String),

    /// Body exceeds the request size limit
    PayloadTooLarge(String),

    /// Required fields missing, or a field fails type/domain parsing
    UnprocessableEntity(String),

    /// Reserved. No operation currently produces it.
    Conflict(String),

    /// Store or other unexpected failure; details are logged, not returned
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            ApiError::RouteNotFound => write!(f, "Resource not found"),
            ApiError::UnsupportedMediaType(msg) => write!(f, "Unsupported media type: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::UnprocessableEntity(msg) => write!(f, "Unprocessable entity: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Auth(e) => Some(e),
            _ => None,
        }
    }
}

/// Error payload for non-auth failures
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric HTTP status, repeated for clients that only read the body
    pub code: u16,
    /// Fixed human-readable message for the category
    pub message: &'static str,
    /// What exactly failed, for validation and media type errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// `error` member of the failure envelope
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Auth(AuthErrorBody),
    Api(ErrorBody),
}

/// Failure envelope: `{"success": false, "error": ...}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorPayload,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => e.status_code(),
            ApiError::NotFound { .. } | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed message for the error category
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Auth(_) => "Unauthorized",
            ApiError::NotFound { .. } | ApiError::RouteNotFound => "Resource not found",
            ApiError::UnsupportedMediaType(_) => "Unsupported media type",
            ApiError::PayloadTooLarge(_) => "Payload too large",
            ApiError::UnprocessableEntity(_) => "Unprocessable entity",
            ApiError::Conflict(_) => "Resource already exists",
            ApiError::Internal(_) => "Internal server error",
        }
    }

    /// Convert to the failure envelope
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::Auth(e) => ErrorPayload::Auth(e.body()),
            other => ErrorPayload::Api(ErrorBody {
                code: other.status_code().as_u16(),
                message: other.message(),
                detail: other.detail(),
            }),
        };
        ErrorResponse {
            success: false,
            error,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ApiError::UnsupportedMediaType(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::UnprocessableEntity(msg) => {
                Some(msg.clone())
            }
            _ => None,
        }
    }

    /// Shorthand for a 422 with a detail message
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(detail.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(msg) => tracing::error!(error = %msg, "request failed"),
            ApiError::Auth(e) => tracing::debug!(code = e.code(), "authorization rejected"),
            _ => tracing::debug!(status = status.as_u16(), error = %self, "request rejected"),
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::UnprocessableEntity(errors.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}
