//! Error type system for Postline
//!
//! This module provides:
//! - A single crate-wide error enum with HTTP status mapping
//! - Field-level validation failures
//! - JSON error responses carrying a trace ID

use crate::api::middleware::current_trace_id;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Message sent for every 401
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Message sent for every 5xx; the detail only goes to the log
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Main error type for the Postline backend
#[derive(Debug, thiserror::Error)]
pub enum PostlineError {
    // System-level errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task error: {0}")]
    TaskError(String),

    // Credential plumbing
    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    // Request errors
    #[error("{}", join_field_errors(.0))]
    ValidationError(Vec<FieldError>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("User already exists.")]
    DuplicateUser,

    // Authentication errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid password.")]
    InvalidCredentials,

    // Lookups
    #[error("User not found.")]
    UserNotFound,

    #[error("Post not found.")]
    PostNotFound,
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl PostlineError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            PostlineError::ValidationError(_)
            | PostlineError::InvalidRequest(_)
            | PostlineError::DuplicateUser => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            PostlineError::Unauthorized | PostlineError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }

            // 404 Not Found
            PostlineError::UserNotFound | PostlineError::PostNotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            PostlineError::ConfigError(_)
            | PostlineError::DatabaseError(_)
            | PostlineError::PoolError(_)
            | PostlineError::IoError(_)
            | PostlineError::TaskError(_)
            | PostlineError::PasswordHash(_)
            | PostlineError::TokenSigning(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            PostlineError::ConfigError(_) => "ConfigError",
            PostlineError::DatabaseError(_) => "DatabaseError",
            PostlineError::PoolError(_) => "PoolError",
            PostlineError::IoError(_) => "IoError",
            PostlineError::TaskError(_) => "TaskError",
            PostlineError::PasswordHash(_) => "PasswordHashError",
            PostlineError::TokenSigning(_) => "TokenSigningError",
            PostlineError::ValidationError(_) => "ValidationError",
            PostlineError::InvalidRequest(_) => "InvalidRequest",
            PostlineError::DuplicateUser => "Conflict",
            PostlineError::Unauthorized => "Unauthorized",
            PostlineError::InvalidCredentials => "InvalidCredentials",
            PostlineError::UserNotFound => "UserNotFound",
            PostlineError::PostNotFound => "PostNotFound",
        }
    }

    /// Message safe to put on the wire
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Field-level details for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response tagged with the current request's trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            details: None,
            trace_id: current_trace_id().unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }

    /// Create an error response from a PostlineError
    pub fn from_error(error: &PostlineError) -> Self {
        let mut response = Self::new(error.error_type().to_string(), error.public_message());
        if let PostlineError::ValidationError(fields) = error {
            response.details = serde_json::to_value(fields).ok();
        }
        response
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (trace_id: {})",
            self.error, self.message, self.trace_id
        )
    }
}

impl IntoResponse for PostlineError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with PostlineError
pub type Result<T> = std::result::Result<T, PostlineError>;
