//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type every HTTP handler returns.
//! Services report failures with their own typed errors (`AuthError`,
//! `TaskError`); the `From` implementations here translate each kind into the
//! HTTP-facing variant by exhaustive matching, so adding a service error kind
//! forces a decision about its status code.
//!
//! `AppError` implements `actix_web::error::ResponseError` to turn itself into
//! a JSON body of the form `{"error": "<message>"}`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::services::{AuthError, TaskError};

/// Represents all possible errors that can reach an HTTP client.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// Malformed request (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist for this caller (HTTP 404).
    NotFound(String),
    /// The request clashes with existing state, e.g. a taken email (HTTP 409).
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Persistence failure (HTTP 500).
    DatabaseError(String),
    /// Input failed validation rules (HTTP 422).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::ValidationError(msg) => msg,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.message()
        }))
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::UserAlreadyRegistered => AppError::Conflict(error.to_string()),
            AuthError::InvalidCredentials => AppError::Unauthorized(error.to_string()),
            AuthError::UserNotFound => AppError::NotFound(error.to_string()),
            AuthError::InvalidToken => AppError::Unauthorized(error.to_string()),
            AuthError::Repository(e) => {
                log::error!("auth storage failure: {}", e);
                AppError::DatabaseError("Database error".into())
            }
            AuthError::Password(e) => {
                log::error!("password hashing failure: {}", e);
                AppError::InternalServerError("Internal server error".into())
            }
            AuthError::Token(e) => {
                log::error!("token issuance failure: {}", e);
                AppError::InternalServerError("Internal server error".into())
            }
        }
    }
}

impl From<TaskError> for AppError {
    fn from(error: TaskError) -> AppError {
        match error {
            TaskError::NotFound => AppError::NotFound("Task not found".into()),
            TaskError::Validation(e) => AppError::ValidationError(e.to_string()),
            TaskError::Repository(e) => {
                log::error!("task storage failure: {}", e);
                AppError::DatabaseError("Database error".into())
            }
        }
    }
}

/// Request-body validation failures raised directly in handlers.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}
