//! HTTP-facing error type
//!
//! Stores and the rate limiter return typed outcomes; this is the only place
//! they are turned into status codes and JSON envelopes.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::features::movies::{MovieError, MovieStoreError};
use crate::features::shared::{extract::MAX_BODY_BYTES, FieldError};

/// Result type alias for handlers
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Edit conflict: {0}")]
    EditConflict(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::EditConflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AppError::EditConflict(_) => "EDIT_CONFLICT",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::Timeout(_) | AppError::Database(_) | AppError::Internal(_) => {
                "INTERNAL_ERROR"
            },
        }
    }

    pub fn not_found() -> Self {
        AppError::NotFound("the requested resource could not be found".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            AppError::Validation(errors) => {
                let details: Map<String, Value> = errors
                    .into_iter()
                    .map(|e| (e.field, Value::String(e.message)))
                    .collect();
                ErrorResponse::with_details(code, "validation failed", Value::Object(details))
            },
            AppError::BadRequest(message)
            | AppError::NotFound(message)
            | AppError::EditConflict(message) => ErrorResponse::new(code, message),
            AppError::MethodNotAllowed => {
                ErrorResponse::new(code, "the method is not allowed for this resource")
            },
            AppError::RateLimited => ErrorResponse::new(code, "rate limit exceeded"),
            AppError::Timeout(after) => {
                tracing::error!(timeout = ?after, "Store operation timed out");
                ErrorResponse::new(code, SERVER_ERROR_MESSAGE)
            },
            AppError::Database(ref e) => {
                tracing::error!(error = ?e, "Database error");
                ErrorResponse::new(code, SERVER_ERROR_MESSAGE)
            },
            AppError::Internal(ref message) => {
                tracing::error!(error = %message, "Internal error");
                ErrorResponse::new(code, SERVER_ERROR_MESSAGE)
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Message sent to clients for every 500; details only go to the log
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

impl From<MovieStoreError> for AppError {
    fn from(err: MovieStoreError) -> Self {
        match err {
            MovieStoreError::NotFound => AppError::not_found(),
            MovieStoreError::EditConflict => AppError::EditConflict(
                "unable to update the record due to an edit conflict, please try again"
                    .to_string(),
            ),
            MovieStoreError::Timeout(after) => AppError::Timeout(after),
            MovieStoreError::Database(e) => AppError::Database(e),
            MovieStoreError::UnsafeSortColumn(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<MovieError> for AppError {
    fn from(err: MovieError) -> Self {
        match err {
            MovieError::Validation(errors) => AppError::Validation(errors),
            MovieError::Store(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => {
                format!("body must not be larger than {MAX_BODY_BYTES} bytes")
            },
            StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                "body must be JSON with content-type application/json".to_string()
            },
            _ => rejection.body_text(),
        };
        AppError::BadRequest(message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
