use std::path::PathBuf;

use serde_json::Value;

use crate::{
    application::{Environment, ports::Params, tasks::args, tasks::task::TaskKind},
    domain::{DomainError, Literal, export_value, naming},
    error::StencilResult,
};

/// A file returning a nested array of values: `config/<name>.php` or
/// `messages/<name>.php`.
///
/// Values are given as `path.to.key|value` pairs separated by commas; dots in
/// the key nest arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesKind {
    kind: &'static str,
    folder: &'static str,
    values: Literal,
}

impl ValuesKind {
    pub fn config() -> Self {
        Self {
            kind: "config",
            folder: "config",
            values: Literal::array(),
        }
    }

    pub fn message() -> Self {
        Self {
            kind: "message",
            folder: "messages",
            values: Literal::array(),
        }
    }

    pub fn values(&self) -> &Literal {
        &self.values
    }

    /// Parse `a.key|a_value, b.key|b_value` and merge it into the values.
    pub fn add_values(&mut self, spec: &str) -> Result<(), DomainError> {
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('|').ok_or_else(|| {
                DomainError::InvalidArgument {
                    operation: "value".into(),
                    reason: format!("expected 'key|value', got '{pair}'"),
                }
            })?;

            let path: Vec<&str> = key.trim().split('.').map(str::trim).collect();
            if path.iter().any(|segment| segment.is_empty()) {
                return Err(DomainError::InvalidArgument {
                    operation: "value".into(),
                    reason: format!("empty key segment in '{}'", key.trim()),
                });
            }
            self.values.set_path(&path, Literal::from(value.trim()));
        }
        Ok(())
    }
}

impl TaskKind for ValuesKind {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn folder(&self) -> &'static str {
        self.folder
    }

    fn template(&self) -> Option<&'static str> {
        Some("config")
    }

    fn file_name(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("{name}.{}", naming::EXT))
    }

    fn supports(&self, operation: &str) -> bool {
        matches!(operation, "value" | "values")
    }

    fn invoke(
        &mut self,
        operation: &str,
        args: &[Literal],
    ) -> Result<Option<Literal>, DomainError> {
        match operation {
            "value" | "values" if args.is_empty() => Ok(Some(self.values.clone())),
            "value" | "values" => {
                for arg in args {
                    match arg {
                        Literal::Array(_) => {
                            for (key, value) in arg.entries() {
                                self.values.insert(key.clone(), value.clone());
                            }
                        }
                        other => {
                            let text = args::text(operation, std::slice::from_ref(other))?;
                            self.add_values(&text)?;
                        }
                    }
                }
                Ok(None)
            }
            _ => Err(DomainError::UndefinedOperation {
                operation: operation.into(),
                target: format!("{} task", self.kind),
            }),
        }
    }

    fn params(&self, _name: &str, _env: &Environment) -> StencilResult<Params> {
        let mut params = Params::new();
        params.insert("values".into(), self.values.to_json());
        params.insert(
            "export".into(),
            Value::String(export_value(&self.values, true, 1)),
        );
        Ok(params)
    }
}
