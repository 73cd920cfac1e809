//! # API Error Handling
//!
//! Every failure leaves a handler as an [`ApiError`], which renders as:
//!
//! ```json
//! { "error": "Insufficient stock available", "code": "INSUFFICIENT_STOCK" }
//! ```
//!
//! ## Error Conversion Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Conversion Flow                                │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                      │
//! │                                  ├──► ApiError ──► status + JSON body  │
//! │  sqlx::Error ──► DbError ────────┘                                      │
//! │                                                                         │
//! │  Internal details (SQL messages, hashing failures) are logged here    │
//! │  and replaced by a generic message.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use knet_core::{CoreError, ValidationError};
use knet_db::DbError;

/// Result alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or invalid input (400)
    ValidationError,

    /// Order quantity exceeds stock (400)
    InsufficientStock,

    /// Missing, invalid or wrong-type token; bad credentials (401)
    Unauthorized,

    /// Authenticated but not allowed (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Unique field already taken (409)
    Conflict,

    /// Body could not be parsed into the expected shape (422)
    UnprocessableEntity,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by every handler.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Overrides the status implied by `code` (JSON rejections carry their own).
    status: Option<StatusCode>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            status: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Generic 500. The detail is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or_else(|| self.code.status())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: ErrorCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::not_found(format!("{} not found", entity)),
            DbError::UniqueViolation { field, .. } if field == "email" => {
                ApiError::conflict("Email already exists")
            }
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, "Insufficient stock available")
            }
            DbError::StillReferenced { entity, dependents, .. } => {
                ApiError::conflict(format!("{} still owns {}", entity, dependents))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::not_found("Referenced record not found")
            }
            // Connection, pool, query and migration failures all surface as 500
            other => ApiError::internal(other),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) => ApiError::not_found("Product not found"),
            CoreError::OrderNotFound(_) => ApiError::not_found("Order not found"),
            CoreError::UserNotFound(_) => ApiError::not_found("User not found"),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, "Insufficient stock available")
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed JSON bodies keep axum's status: 400 for broken syntax, 415 for
/// a missing content type, 422 for bodies that don't match the expected shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let code = if status == StatusCode::UNPROCESSABLE_ENTITY {
            ErrorCode::UnprocessableEntity
        } else {
            ErrorCode::ValidationError
        };
        ApiError {
            code,
            message: rejection.body_text(),
            status: Some(status),
        }
    }
}

impl ApiError {
    /// Wraps an extractor rejection, keeping the status axum chose.
    fn rejected(status: StatusCode, message: String) -> Self {
        let code = if status.is_server_error() {
            ErrorCode::Internal
        } else {
            ErrorCode::ValidationError
        };
        ApiError {
            code,
            message,
            status: Some(status),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::rejected(rejection.status(), rejection.body_text())
    }
}

/// Plain HTTP requests to `/ws`: 405 for the wrong method, 426 or 400 for
/// missing upgrade headers.
impl From<WebSocketUpgradeRejection> for ApiError {
    fn from(rejection: WebSocketUpgradeRejection) -> Self {
        ApiError::rejected(rejection.status(), rejection.body_text())
    }
}
