//! # Error handling
//!
//! Every handler returns `Result<T, AppError>`. `AppError` converts itself
//! into the shared error envelope:
//!
//! ```json
//! { "status": "error", "error": { "code": "not_found", "message": "session at index 3 not found" } }
//! ```
//!
//! Validation errors also carry the offending `field`. Database and internal
//! errors are logged with their details; the client only sees a generic
//! message.

use crate::tree::{LocateError, TreeError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 404. The message names what was missing ("planning", "week 3", ...).
    #[error("{0}")]
    NotFound(String),

    /// 400
    #[error("{0}")]
    BadRequest(String),

    /// 400 tied to one input field.
    #[error("invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    /// 401
    #[error("{0}")]
    Unauthorized(String),

    /// 403
    #[error("{0}")]
    Forbidden(String),

    /// 409
    #[error("{0}")]
    Conflict(String),

    /// 500
    #[error("Internal error: {0}")]
    Internal(String),

    /// 500
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(format!("{} not found", what.into()))
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<LocateError> for AppError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::Missing(_) => AppError::BadRequest(err.to_string()),
            _ => AppError::NotFound(err.to_string()),
        }
    }
}

impl From<TreeError> for AppError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Locate(e) => e.into(),
            TreeError::Invalid { field, message } => AppError::InvalidField { field, message },
            TreeError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            AppError::InvalidField { field, message } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("invalid {}: {}", field, message),
                Some(field),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        let body = Json(json!({
            "status": "error",
            "error": error,
        }));

        (status, body).into_response()
    }
}
