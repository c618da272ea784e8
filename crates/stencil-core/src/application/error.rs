//! Application layer errors.
//!
//! These errors represent failures in orchestration and collaborators, not
//! generator rules. Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while driving tasks through their collaborators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Template rendering failed.
    #[error("Template rendering failed for '{template}': {reason}")]
    RenderingFailed { template: String, reason: String },

    /// Artifact store operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Artifact store is locked")]
    StoreLockError,

    /// Refusing to overwrite without `force`.
    #[error("File already exists at {path}")]
    ArtifactExists { path: PathBuf },

    /// A configuration/message source could not be read.
    #[error("Config lookup failed for '{source_name}': {reason}")]
    ConfigLookup { source_name: String, reason: String },

    /// A source file could not be read or scanned.
    #[error("Cannot read source {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::RenderingFailed { template, .. } => vec![
                format!("Template '{}' could not be rendered", template),
                "Check --template or the templates directory in your configuration".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StoreLockError => vec![
                "The artifact store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::ArtifactExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Use --pretend to preview what would be written".into(),
            ],
            Self::ConfigLookup { source_name, .. } => vec![
                format!("Check that the config source '{}' exists and parses", source_name),
            ],
            Self::SourceUnreadable { path, .. } => vec![format!(
                "Check the file is readable and valid: {}",
                path.display()
            )],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RenderingFailed { .. } => ErrorCategory::Internal,
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::ArtifactExists { .. } => ErrorCategory::Validation,
            Self::ConfigLookup { .. } => ErrorCategory::Configuration,
            Self::SourceUnreadable { .. } => ErrorCategory::Internal,
        }
    }
}
