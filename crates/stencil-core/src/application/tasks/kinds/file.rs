use std::path::PathBuf;

use serde_json::Value;

use crate::{
    application::{Environment, ports::Params, tasks::args, tasks::task::TaskKind},
    domain::{DomainError, Literal},
    error::StencilResult,
};

/// An arbitrary file with literal content. The task name is the file name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileKind {
    content: String,
}

impl TaskKind for FileKind {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn template(&self) -> Option<&'static str> {
        None
    }

    fn file_name(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    fn supports(&self, operation: &str) -> bool {
        operation == "content"
    }

    fn invoke(
        &mut self,
        operation: &str,
        args: &[Literal],
    ) -> Result<Option<Literal>, DomainError> {
        match (operation, args.first()) {
            ("content", None) => Ok(Some(Literal::from(self.content.as_str()))),
            ("content", Some(_)) => {
                self.content = args::text(operation, args)?;
                Ok(None)
            }
            _ => Err(DomainError::UndefinedOperation {
                operation: operation.into(),
                target: "file task".into(),
            }),
        }
    }

    fn params(&self, _name: &str, _env: &Environment) -> StencilResult<Params> {
        let mut params = Params::new();
        params.insert("content".into(), Value::String(self.content.clone()));
        Ok(params)
    }
}
