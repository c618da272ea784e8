use serde_json::{Value, json};

use crate::{
    application::{Environment, ports::Params, tasks::args, tasks::task::TaskKind},
    domain::{DomainError, Literal},
    error::StencilResult,
};

/// A new class, optionally extending a parent and implementing interfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassKind {
    extends: Option<String>,
    implements: Vec<String>,
    is_abstract: bool,
    blank: bool,
}

impl TaskKind for ClassKind {
    fn kind(&self) -> &'static str {
        "class"
    }

    fn template(&self) -> Option<&'static str> {
        Some("class")
    }

    fn supports(&self, operation: &str) -> bool {
        matches!(operation, "extend" | "implement" | "abstract" | "as_abstract" | "blank")
    }

    fn invoke(
        &mut self,
        operation: &str,
        args: &[Literal],
    ) -> Result<Option<Literal>, DomainError> {
        match operation {
            "extend" => match args::optional_text(operation, args)? {
                Some(parent) if !parent.is_empty() => self.extends = Some(parent),
                Some(_) => self.extends = None,
                None => return Ok(Some(self.extends.clone().map_or(Literal::Null, Literal::from))),
            },
            "implement" => self.implements.extend(args::list(operation, args)?),
            "abstract" | "as_abstract" => self.is_abstract = args::flag(operation, args)?,
            "blank" => self.blank = args::flag(operation, args)?,
            _ => {
                return Err(DomainError::UndefinedOperation {
                    operation: operation.into(),
                    target: "class task".into(),
                });
            }
        }
        Ok(None)
    }

    fn params(&self, _name: &str, _env: &Environment) -> StencilResult<Params> {
        let mut params = Params::new();
        params.insert(
            "extends".into(),
            self.extends.clone().map_or(Value::Null, Value::String),
        );
        params.insert("implements".into(), json!(self.implements));
        params.insert("abstract".into(), Value::Bool(self.is_abstract));
        params.insert("blank".into(), Value::Bool(self.blank));
        Ok(params)
    }
}
