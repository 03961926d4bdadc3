//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Required request field missing or empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Input failed validation (malformed email, etc.)
    #[error("{0}")]
    Validation(String),

    /// Approval status literal outside the recognized set
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Email already registered
    #[error("An account with this email already exists")]
    EmailTaken,

    /// Credentials did not match (unknown email or wrong password)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Reset token unknown, consumed, or expired
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    /// Federated identity assertion rejected by the provider
    #[error("Invalid identity token")]
    InvalidProviderToken,

    /// No valid session token on a protected route
    #[error("Authentication required")]
    AuthRequired,

    /// Session is valid but the account is not an admin
    #[error("Admin access required")]
    AdminRequired,

    /// Doctor lookup miss
    #[error("Doctor not found")]
    DoctorNotFound,

    /// Mail transport failure
    #[error("Mail delivery failed: {0}")]
    Mail(#[from] platform::mail::MailError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::MissingField(_)
            | IdentityError::Validation(_)
            | IdentityError::InvalidStatus(_)
            | IdentityError::InvalidResetToken => StatusCode::BAD_REQUEST,
            IdentityError::InvalidCredentials
            | IdentityError::InvalidProviderToken
            | IdentityError::AuthRequired => StatusCode::UNAUTHORIZED,
            IdentityError::AdminRequired => StatusCode::FORBIDDEN,
            IdentityError::DoctorNotFound => StatusCode::NOT_FOUND,
            IdentityError::EmailTaken => StatusCode::CONFLICT,
            IdentityError::Mail(_) | IdentityError::Database(_) | IdentityError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::MissingField(_)
            | IdentityError::Validation(_)
            | IdentityError::InvalidStatus(_)
            | IdentityError::InvalidResetToken => ErrorKind::BadRequest,
            IdentityError::InvalidCredentials
            | IdentityError::InvalidProviderToken
            | IdentityError::AuthRequired => ErrorKind::Unauthorized,
            IdentityError::AdminRequired => ErrorKind::Forbidden,
            IdentityError::DoctorNotFound => ErrorKind::NotFound,
            IdentityError::EmailTaken => ErrorKind::Conflict,
            IdentityError::Mail(_) | IdentityError::Database(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError.
    ///
    /// Collaborator failures are reduced to a generic message; the detail
    /// stays in the logs. Validation detail is safe to surface.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            AppError::new(kind, "Internal server error")
        } else {
            AppError::new(kind, self.to_string())
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Mail(e) => {
                tracing::error!(error = %e, "Identity mail transport error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            IdentityError::InvalidProviderToken => {
                tracing::warn!("Rejected federated identity token");
            }
            IdentityError::AdminRequired => {
                tracing::warn!("Non-admin attempted a moderation action");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        if err.kind() == ErrorKind::BadRequest {
            IdentityError::Validation(err.message().to_string())
        } else {
            IdentityError::Internal(err.to_string())
        }
    }
}
