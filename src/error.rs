//!
//! # Custom Error Handling
//!
//! This module defines the `AppError` type used throughout the application.
//! Every failure a handler, the auth middleware or a store can produce ends up
//! here and is rendered as a single JSON body:
//!
//! ```json
//! { "success": false, "message": "..." }
//! ```
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can
//! simply return `Result<_, AppError>` and use `?` on `sqlx`, `validator`,
//! token and password errors through the `From` implementations below.
//! Internal failures are logged but never echoed back to the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use crate::auth::password::PasswordError;
use crate::auth::token::TokenError;
use crate::models::ApiMessage;

/// Message returned for every 401, whatever the underlying cause.
pub const ACCESS_DENIED: &str = "Access denied";

const INTERNAL: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body failed validation. The message enumerates every violation.
    #[error("{0}")]
    Validation(String),
    /// Malformed request that is not a validation failure (bad JSON, bad path id).
    #[error("{0}")]
    BadRequest(String),
    /// A patch request that carried no fields at all.
    #[error("at least one field must be provided")]
    EmptyPatch,
    /// Unique constraint clash, e.g. registering an email twice.
    #[error("{0}")]
    Conflict(String),
    /// Missing, malformed, invalid or expired credentials. Carries no cause.
    #[error("Access denied")]
    Unauthorized,
    /// A resource addressed by id does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Any `sqlx` failure that is not a not-found or a unique violation.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    /// Hashing, signing or other server-side failures.
    #[error("internal error: {0}")]
    Internal(String),
    /// Invalid or missing configuration, only raised during startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// The message that is safe to show to a client.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                INTERNAL.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::EmptyPatch
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(ApiMessage::failure(self.public_message()))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, unique violations become `Conflict` and
/// dangling user references become `BadRequest`. Everything else stays an
/// opaque `Database` error.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Record already exists".into())
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::BadRequest("Referenced user does not exist".into())
            }
            other => AppError::Database(other),
        }
    }
}

/// Flattens every field error into one `field: message` list, sorted by field
/// name so the output is stable.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let violations: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid ({})", field, err.code),
                })
            })
            .collect();

        AppError::Validation(violations.join("; "))
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => AppError::Internal(msg),
            _ => AppError::Unauthorized,
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(error: PasswordError) -> AppError {
        match error {
            PasswordError::Hashing(msg) => AppError::Internal(msg),
            PasswordError::Mismatch => AppError::Unauthorized,
        }
    }
}
