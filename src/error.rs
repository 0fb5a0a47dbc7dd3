//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It covers everything from configuration mistakes at startup to database and
//! validation failures inside request handlers.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers and extractors
//! can return it directly; it is rendered as a JSON body `{"error": "..."}` with the
//! matching status code. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and `bcrypt::BcryptError`
//! allow conversion with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Unique index over `lower(users.email)`.
pub(crate) const USERS_EMAIL_INDEX: &str = "ix_users_email_lower";
/// Foreign key from `tasks.author_id` to `users.id`.
pub(crate) const TASKS_AUTHOR_FKEY: &str = "tasks_author_id_fkey";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or conflicting request (HTTP 400).
    BadRequest(String),
    /// The requested record does not exist, or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from `sqlx` (HTTP 500).
    /// The detail is logged; clients only see a generic message.
    DatabaseError(String),
    /// Input failed validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// A required setting is missing or could not be parsed (HTTP 500).
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                "Database error"
            }
            AppError::Configuration(msg) => {
                log::error!("configuration error: {}", msg);
                "Server misconfigured"
            }
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`. Constraint violations are told apart by
/// SQLSTATE and constraint name; everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) => {
                constraint_error(db_err.code().as_deref(), db_err.constraint())
                    .unwrap_or_else(|| AppError::DatabaseError(error.to_string()))
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

fn constraint_error(code: Option<&str>, constraint: Option<&str>) -> Option<AppError> {
    match (code?, constraint) {
        (UNIQUE_VIOLATION, Some(USERS_EMAIL_INDEX)) => {
            Some(AppError::BadRequest("Email already registered".into()))
        }
        (UNIQUE_VIOLATION, _) => Some(AppError::BadRequest("Record already exists".into())),
        // The author was deleted while their token was still valid.
        (FOREIGN_KEY_VIOLATION, Some(TASKS_AUTHOR_FKEY)) => {
            Some(AppError::NotFound("User not found".into()))
        }
        (FOREIGN_KEY_VIOLATION, _) => {
            Some(AppError::NotFound("Referenced record not found".into()))
        }
        _ => None,
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
