//! CLI error type, exit codes and the error report printed on failure.

use std::error::Error as _;
use std::fmt::Write as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use stencil_core::error::{ErrorCategory, StencilError};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// `--remove` without `--yes` where no prompt can be shown.
    #[error("Refusing to {action} without confirmation")]
    ConfirmationRequired { action: String },

    /// The settings file or environment could not be loaded.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Generation failed: {0}")]
    Core(#[from] StencilError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,

    /// The binary was built without the named cargo feature.
    #[error("Feature not available: {feature}")]
    FeatureNotAvailable { feature: &'static str },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Settings are loaded through `anyhow`; any failure there is a config error.
impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::ConfigError {
            message: format!("{err:#}"),
            source: None,
        }
    }
}

/// How a failure is reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Bad arguments, existing files, refused or cancelled prompts.
    Usage,
    /// Missing module or class.
    NotFound,
    Config,
    Internal,
}

impl ExitKind {
    pub fn code(self) -> u8 {
        match self {
            Self::Internal => 1,
            Self::Usage => 2,
            Self::NotFound => 3,
            Self::Config => 4,
        }
    }
}

impl From<ErrorCategory> for ExitKind {
    fn from(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Validation => Self::Usage,
            ErrorCategory::NotFound => Self::NotFound,
            ErrorCategory::Configuration => Self::Config,
            ErrorCategory::Internal => Self::Internal,
        }
    }
}

impl CliError {
    pub fn kind(&self) -> ExitKind {
        match self {
            Self::InvalidInput { .. } | Self::ConfirmationRequired { .. } | Self::Cancelled => {
                ExitKind::Usage
            }
            Self::ConfigError { .. } | Self::FeatureNotAvailable { .. } => ExitKind::Config,
            Self::Core(err) => err.category().into(),
            Self::IoError { .. } => ExitKind::Internal,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.kind().code()
    }

    /// Hints printed under the error message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { .. } => vec!["Run with --help to see the accepted arguments".into()],
            Self::ConfirmationRequired { action } => vec![
                format!("Pass --yes to {action} without a prompt"),
                "Use --pretend to list the affected files first".into(),
            ],
            Self::ConfigError { .. } => vec![
                "Run 'stencil config path' to see which file is read".into(),
                "Check STENCIL_* environment variables for typos".into(),
            ],
            Self::Core(err) => err.suggestions(),
            Self::IoError { .. } => vec!["Check that the target directory is writable".into()],
            Self::Cancelled => vec!["No files were removed".into()],
            Self::FeatureNotAvailable { feature } => vec![format!(
                "Reinstall with: cargo install stencil-cli --features {feature}"
            )],
        }
    }

    /// Error report for stderr. `color` styles it for a terminal.
    pub fn report(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: fn(&str) -> String| {
            if color { style(text) } else { text.to_string() }
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "\n{} {}",
            paint("error:", |s| s.red().bold().to_string()),
            self
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let _ = writeln!(
                    out,
                    "  {}",
                    paint(&format!("caused by: {err}"), |s| s.dimmed().to_string())
                );
                cause = err.source();
            }
        }

        let hints = self.suggestions();
        if !hints.is_empty() {
            let _ = writeln!(out, "\n{}", paint("hint:", |s| s.yellow().bold().to_string()));
            for hint in hints {
                let _ = writeln!(out, "  {hint}");
            }
        }

        if !verbose {
            let _ = writeln!(
                out,
                "\n{}",
                paint("Run with -v for the full error chain.", |s| s
                    .dimmed()
                    .to_string())
            );
        }
        out
    }

    pub fn log(&self) {
        match self.kind() {
            ExitKind::Usage | ExitKind::NotFound => tracing::warn!(error = %self, "Command rejected"),
            ExitKind::Config | ExitKind::Internal => tracing::error!(error = %self, "Command failed"),
        }
        if let Some(source) = self.source() {
            tracing::debug!(cause = %source, "Error source");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use stencil_core::{application::ApplicationError, domain::DomainError};

    fn core(err: impl Into<StencilError>) -> CliError {
        CliError::Core(err.into())
    }

    #[test]
    fn core_categories_map_to_exit_codes() {
        let missing_module = core(DomainError::ModuleNotFound {
            module: "blog".into(),
        });
        assert_eq!(missing_module.exit_code(), 3);

        let undefined = core(DomainError::UndefinedOperation {
            operation: "explode".into(),
            target: "Builder".into(),
        });
        assert_eq!(undefined.exit_code(), 2);

        let lookup = core(ApplicationError::ConfigLookup {
            source_name: "generator".into(),
            reason: "bad toml".into(),
        });
        assert_eq!(lookup.exit_code(), 4);

        let io_failure = CliError::IoError {
            message: "x".into(),
            source: io::Error::other("e"),
        };
        assert_eq!(io_failure.kind(), ExitKind::Internal);
        assert_eq!(io_failure.exit_code(), 1);
    }

    #[test]
    fn existing_file_suggests_force() {
        let err = core(ApplicationError::ArtifactExists {
            path: "/app/classes/Foo.php".into(),
        });
        assert_eq!(err.exit_code(), 2);
        assert!(err.suggestions().iter().any(|s| s.contains("--force")));
    }

    #[test]
    fn confirmation_required_suggests_yes() {
        let err = CliError::ConfirmationRequired {
            action: "remove files".into(),
        };
        assert_eq!(err.to_string(), "Refusing to remove files without confirmation");
        assert!(err.suggestions().iter().any(|s| s.contains("--yes")));
    }

    #[test]
    fn plain_report_has_message_and_hint() {
        let err = core(DomainError::MissingSource);
        let s = err.report(false, false);
        assert!(s.contains("error: Generation failed: No source is available to analyze"));
        assert!(s.contains("Run with -v"));
    }

    #[test]
    fn verbose_report_lists_causes() {
        let err = CliError::IoError {
            message: "cannot read Cache.php".into(),
            source: io::Error::other("permission denied"),
        };
        let s = err.report(true, false);
        assert!(s.contains("caused by: permission denied"));
        assert!(!s.contains("Run with -v"));
    }

    #[test]
    fn config_failures_become_config_errors() {
        let err: CliError = anyhow::anyhow!("missing field `paths`").into();
        assert_eq!(err.kind(), ExitKind::Config);
        assert_eq!(err.exit_code(), 4);
    }
}
