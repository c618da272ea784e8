use std::path::PathBuf;

use serde_json::{Value, json};

use crate::{
    application::{Environment, ports::Params, tasks::args, tasks::task::TaskKind},
    domain::{DomainError, Literal, naming},
    error::StencilResult,
};

const PREFIX: &str = "Controller";
const DEFAULT_PARENT: &str = "Controller";
const DEFAULT_ACTION: &str = "index";

/// A request controller. `Welcome` becomes `Controller_Welcome` in
/// `classes/Controller/Welcome.php`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerKind {
    extends: Option<String>,
    actions: Vec<String>,
    blank: bool,
}

impl ControllerKind {
    /// Actions to render; `index` when none were given and not blank.
    pub fn actions(&self) -> Vec<String> {
        if self.blank {
            Vec::new()
        } else if self.actions.is_empty() {
            vec![DEFAULT_ACTION.to_string()]
        } else {
            self.actions.clone()
        }
    }
}

impl TaskKind for ControllerKind {
    fn kind(&self) -> &'static str {
        "controller"
    }

    fn template(&self) -> Option<&'static str> {
        Some("controller")
    }

    fn file_name(&self, name: &str) -> PathBuf {
        naming::class_to_path(&naming::with_prefix(PREFIX, name))
    }

    fn supports(&self, operation: &str) -> bool {
        matches!(operation, "extend" | "action" | "actions" | "blank")
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
                None => {
                    return Ok(Some(Literal::from(
                        self.extends.as_deref().unwrap_or(DEFAULT_PARENT),
                    )));
                }
            },
            "action" | "actions" if args.is_empty() => {
                return Ok(Some(Literal::list(self.actions())));
            }
            "action" | "actions" => self.actions.extend(args::list(operation, args)?),
            "blank" => self.blank = args::flag(operation, args)?,
            _ => {
                return Err(DomainError::UndefinedOperation {
                    operation: operation.into(),
                    target: "controller task".into(),
                });
            }
        }
        Ok(None)
    }

    fn params(&self, name: &str, _env: &Environment) -> StencilResult<Params> {
        let mut params = Params::new();
        params.insert(
            "name".into(),
            Value::String(naming::with_prefix(PREFIX, name)),
        );
        params.insert(
            "extends".into(),
            Value::String(self.extends.as_deref().unwrap_or(DEFAULT_PARENT).to_string()),
        );
        params.insert("actions".into(), json!(self.actions()));
        params.insert("blank".into(), Value::Bool(self.blank));
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use std::path::Path;

    #[test]
    fn name_and_file_carry_the_prefix() {
        let kind = ControllerKind::default();
        assert_eq!(kind.file_name("Welcome"), Path::new("Controller/Welcome.php"));
        assert_eq!(
            kind.file_name("Controller_Admin_User"),
            Path::new("Controller/Admin/User.php")
        );

        let params = kind.params("Welcome", &testing::env()).unwrap();
        assert_eq!(params["name"], "Controller_Welcome");
        assert_eq!(params["extends"], "Controller");
        assert_eq!(params["actions"], json!(["index"]));
    }

    #[test]
    fn actions_append_and_blank_clears() {
        let mut kind = ControllerKind::default();
        kind.invoke("extend", &[Literal::from("Controller_Template")])
            .unwrap();
        kind.invoke("action", &[Literal::from("list, view")]).unwrap();
        kind.invoke("action", &[Literal::from("edit")]).unwrap();
        assert_eq!(kind.actions(), vec!["list", "view", "edit"]);

        kind.invoke("blank", &[]).unwrap();
        let params = kind.params("Welcome", &testing::env()).unwrap();
        assert_eq!(params["actions"], json!([]));
        assert_eq!(params["extends"], "Controller_Template");
    }
}
