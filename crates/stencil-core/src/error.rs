//! Unified error handling for Stencil Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Stencil Core operations.
///
/// This enum wraps all possible errors that can occur when using stencil-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StencilError {
    /// Errors from the domain layer (unknown kinds, missing members, bad literals).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (store, renderer, lookups).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StencilError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Stencil".into(),
                "Please report this issue at: https://github.com/cosecruz/stencil/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Message template with `:name` placeholders, for presentation layers
    /// that interpolate their own messages.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.template(),
            Self::Application(_) => ":message",
            Self::Configuration { .. } => "Configuration error: :message",
            Self::Internal { .. } => "Internal error: :message",
        }
    }

    /// Placeholder values matching [`Self::template`].
    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Domain(e) => e.placeholders(),
            Self::Application(e) => vec![(":message", e.to_string())],
            Self::Configuration { message } | Self::Internal { message } => {
                vec![(":message", message.clone())]
            }
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::StoreLockError))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StencilResult<T> = Result<T, StencilError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interpolate;

    #[test]
    fn domain_errors_keep_their_category() {
        let err: StencilError = DomainError::ModuleNotFound {
            module: "blog".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(
            err.to_string(),
            "Module 'blog' is not loaded or does not exist"
        );
    }

    #[test]
    fn template_interpolates_to_display() {
        let err: StencilError = DomainError::UnknownType {
            kind: "widget".into(),
        }
        .into();
        assert_eq!(
            interpolate(err.template(), &err.placeholders()),
            err.to_string()
        );
    }

    #[test]
    fn store_lock_is_retryable() {
        let err: StencilError = ApplicationError::StoreLockError.into();
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
