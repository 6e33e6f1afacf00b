//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Domain crates keep their own error enums with machine-readable codes;
/// this type is the common currency at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request conflicts with the current state of a record.
    #[error("State conflict: {0}")]
    Conflict(String),

    /// A multi-step operation failed and was rolled back.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error carrying a domain-specific code and status.
    #[error("{message}")]
    Domain {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::OperationFailed(_) | Self::Internal(_) => 500,
            Self::Domain { status, .. } => *status,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "STATE_CONFLICT",
            Self::OperationFailed(_) => "OPERATION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain { code, .. } => *code,
        }
    }
}
