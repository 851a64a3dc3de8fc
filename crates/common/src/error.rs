//! Error types for linkboard.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Every variant is recoverable at the point of the action that produced it;
/// callers surface the [`Display`](std::fmt::Display) text as a short
/// notification and keep going. Nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller is not signed in. Raised locally, before any network call.
    #[error("not authenticated")]
    Unauthenticated,

    /// The caller is signed in but may not perform this action.
    ///
    /// This mirrors the store's row-level policy as a local pre-check; the
    /// store still rejects the action on its own if the check is bypassed.
    #[error("not authorized: {0}")]
    Forbidden(String),

    /// A store-level uniqueness constraint was violated.
    ///
    /// For favorite insertion this is a benign outcome, not a failure.
    #[error("already exists: {0}")]
    Conflict(String),

    /// A row was expected but is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rejected input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport failure or any store error not covered above.
    #[error("backend error: {0}")]
    Backend(String),

    /// Configuration load failure.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Returns whether this error was raised locally, without a network call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::Forbidden(_) | Self::Validation(_)
        )
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::Unauthenticated.error_code(), "UNAUTHENTICATED");
        assert_eq!(
            AppError::Forbidden("delete".to_string()).error_code(),
            "FORBIDDEN"
        );
        assert_eq!(
            AppError::Conflict("favorite".to_string()).error_code(),
            "CONFLICT"
        );
    }

    #[test]
    fn test_local_errors_need_no_network() {
        assert!(AppError::Unauthenticated.is_local());
        assert!(AppError::Forbidden("x".to_string()).is_local());
        assert!(!AppError::Backend("timeout".to_string()).is_local());
        assert!(!AppError::Conflict("x".to_string()).is_local());
    }

    #[test]
    fn test_display_is_short_and_human_readable() {
        assert_eq!(AppError::Unauthenticated.to_string(), "not authenticated");
        assert_eq!(
            AppError::Forbidden("only the creator can delete a link".to_string()).to_string(),
            "not authorized: only the creator can delete a link"
        );
    }
}
