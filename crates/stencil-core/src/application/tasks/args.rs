//! Argument coercion for task operations.

use crate::domain::{DomainError, Literal, naming};

fn invalid(operation: &str, reason: impl Into<String>) -> DomainError {
    DomainError::InvalidArgument {
        operation: operation.to_string(),
        reason: reason.into(),
    }
}

/// First argument as text. Missing or non-scalar arguments are rejected.
pub(crate) fn text(operation: &str, args: &[Literal]) -> Result<String, DomainError> {
    args.first()
        .and_then(Literal::as_text)
        .ok_or_else(|| invalid(operation, "expected a text value"))
}

/// First argument as text, or `None` when no argument was given.
pub(crate) fn optional_text(operation: &str, args: &[Literal]) -> Result<Option<String>, DomainError> {
    match args.first() {
        None => Ok(None),
        Some(_) => text(operation, args).map(Some),
    }
}

/// First argument as a flag. No argument means `true`.
pub(crate) fn flag(operation: &str, args: &[Literal]) -> Result<bool, DomainError> {
    match args.first() {
        None => Ok(true),
        Some(Literal::Null) => Ok(false),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid(operation, format!("expected a boolean, got {}", value.export()))),
    }
}

/// Every argument flattened into a list: comma-separated text is split,
/// arrays contribute their values.
pub(crate) fn list(operation: &str, args: &[Literal]) -> Result<Vec<String>, DomainError> {
    let mut items = Vec::new();
    for arg in args {
        match arg {
            Literal::Null => {}
            Literal::Array(entries) => {
                for (_, value) in entries {
                    items.extend(list(operation, std::slice::from_ref(value))?);
                }
            }
            other => {
                let text = other
                    .as_text()
                    .ok_or_else(|| invalid(operation, "expected text or a list"))?;
                items.extend(naming::split_list(&text));
            }
        }
    }
    Ok(items)
}
