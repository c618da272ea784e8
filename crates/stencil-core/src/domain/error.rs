// ============================================================================
// domain/error.rs - GENERATOR ERROR DOMAIN
// ============================================================================

use std::fmt;

use thiserror::Error;

/// Root domain error type.
///
/// Every variant carries a message template with `:name` placeholders
/// ([`DomainError::template`]) plus the values to substitute
/// ([`DomainError::placeholders`]). `Display` is the interpolated template.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    #[error("Generator type '{kind}' does not exist")]
    UnknownType { kind: String },

    #[error("Module '{module}' is not loaded or does not exist")]
    ModuleNotFound { module: String },

    #[error("Method {operation}() is not defined for {target}")]
    UndefinedOperation { operation: String, target: String },

    // ========================================================================
    // Introspection Errors
    // ========================================================================
    #[error("No source is available to analyze")]
    MissingSource,

    #[error("{}", .member.message())]
    NotFound { member: Member },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Invalid literal at offset {position}: {reason}")]
    InvalidLiteral { position: usize, reason: String },

    #[error("Invalid argument for {operation}(): {reason}")]
    InvalidArgument { operation: String, reason: String },
}

/// The member an introspection lookup failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Type { name: String },
    Constant { name: String },
    Property { name: String },
    Method { name: String },
    Param { method: String, name: String },
}

impl Member {
    /// Full sentence naming the missing member.
    pub fn message(&self) -> String {
        match self {
            Self::Type { name } => format!("Class {name} does not exist"),
            Self::Constant { name } => format!("Constant {name} does not exist"),
            Self::Property { name } => format!("Property {name} does not exist"),
            Self::Method { name } => format!("Method {name} does not exist"),
            Self::Param { method, name } => {
                format!("Param {name} does not exist for method {method}")
            }
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { name }
            | Self::Constant { name }
            | Self::Property { name }
            | Self::Method { name } => f.write_str(name),
            Self::Param { method, name } => write!(f, "{method}(${name})"),
        }
    }
}

impl DomainError {
    /// Shorthand for a missing introspected member.
    pub fn not_found(member: Member) -> Self {
        Self::NotFound { member }
    }

    /// The untranslated message with `:name` placeholders.
    pub fn template(&self) -> &'static str {
        match self {
            Self::UnknownType { .. } => "Generator type ':type' does not exist",
            Self::ModuleNotFound { .. } => "Module ':module' is not loaded or does not exist",
            Self::UndefinedOperation { .. } => "Method :method() is not defined for :class",
            Self::MissingSource => "No source is available to analyze",
            Self::NotFound { member } => match member {
                Member::Type { .. } => "Class :source does not exist",
                Member::Constant { .. } => "Constant :constant does not exist",
                Member::Property { .. } => "Property :property does not exist",
                Member::Method { .. } => "Method :method does not exist",
                Member::Param { .. } => "Param :param does not exist for method :method",
            },
            Self::MissingRequiredField { .. } => "Required field missing: :field",
            Self::InvalidLiteral { .. } => "Invalid literal at offset :position: :reason",
            Self::InvalidArgument { .. } => "Invalid argument for :operation(): :reason",
        }
    }

    /// Placeholder values for [`Self::template`].
    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::UnknownType { kind } => vec![(":type", kind.clone())],
            Self::ModuleNotFound { module } => vec![(":module", module.clone())],
            Self::UndefinedOperation { operation, target } => {
                vec![(":method", operation.clone()), (":class", target.clone())]
            }
            Self::MissingSource => Vec::new(),
            Self::NotFound { member } => match member {
                Member::Type { name } => vec![(":source", name.clone())],
                Member::Constant { name } => vec![(":constant", name.clone())],
                Member::Property { name } => vec![(":property", name.clone())],
                Member::Method { name } => vec![(":method", name.clone())],
                Member::Param { method, name } => {
                    vec![(":param", name.clone()), (":method", method.clone())]
                }
            },
            Self::MissingRequiredField { field } => vec![(":field", (*field).to_string())],
            Self::InvalidLiteral { position, reason } => {
                vec![(":position", position.to_string()), (":reason", reason.clone())]
            }
            Self::InvalidArgument { operation, reason } => {
                vec![(":operation", operation.clone()), (":reason", reason.clone())]
            }
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownType { kind } => vec![
                format!("'{}' is not a registered generator type", kind),
                "Built-in types: class, clone, controller, unittest, file, config, message".into(),
            ],
            Self::ModuleNotFound { module } => vec![
                format!("Enable the '{}' module or create its directory", module),
                "Use --no-verify to generate into a module that does not exist yet".into(),
            ],
            Self::MissingSource => vec!["Name the class to clone with --clone".into()],
            Self::NotFound {
                member: Member::Type { name },
            } => vec![
                format!("Class '{}' was not found in the scanned sources", name),
                "Check the source directories listed in your configuration".into(),
            ],
            Self::UndefinedOperation { operation, .. } => vec![
                format!("'{}' is not an option of the last added generator", operation),
                "Add a generator first with add_<type>".into(),
            ],
            Self::MissingRequiredField { field } => {
                vec![format!("Provide a value for '{}'", field)]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownType { .. } | Self::ModuleNotFound { .. } | Self::NotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::UndefinedOperation { .. }
            | Self::MissingSource
            | Self::MissingRequiredField { .. }
            | Self::InvalidLiteral { .. }
            | Self::InvalidArgument { .. } => ErrorCategory::Validation,
        }
    }
}

/// Substitute `:name` placeholders in a message template.
///
/// Longer placeholder names are substituted first so that `:method` never
/// clobbers a hypothetical `:methods`.
pub fn interpolate(template: &str, placeholders: &[(&str, String)]) -> String {
    let mut ordered: Vec<_> = placeholders.iter().collect();
    ordered.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));

    ordered
        .into_iter()
        .fold(template.to_string(), |message, (name, value)| {
            message.replace(name, value)
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
