use std::path::PathBuf;

use serde_json::{Value, json};

use crate::{
    application::{Environment, ports::Params, tasks::args, tasks::task::TaskKind},
    domain::{DomainError, Literal, naming},
    error::StencilResult,
};

const SUFFIX: &str = "Test";
const DEFAULT_PARENT: &str = "Unittest_TestCase";

/// A test case for a class. `Foo_Bar` becomes `Foo_BarTest` in
/// `tests/Foo/BarTest.php`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnittestKind {
    extends: Option<String>,
    groups: Vec<String>,
    blank: bool,
}

impl UnittestKind {
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Name of the test class for the class under test.
    pub fn test_name(subject: &str) -> String {
        if subject.ends_with(SUFFIX) {
            subject.to_string()
        } else {
            format!("{subject}{SUFFIX}")
        }
    }
}

impl TaskKind for UnittestKind {
    fn kind(&self) -> &'static str {
        "unittest"
    }

    fn folder(&self) -> &'static str {
        "tests"
    }

    fn template(&self) -> Option<&'static str> {
        Some("unittest")
    }

    fn file_name(&self, name: &str) -> PathBuf {
        naming::class_to_path(&Self::test_name(name))
    }

    fn supports(&self, operation: &str) -> bool {
        matches!(operation, "extend" | "group" | "blank")
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
            "group" if args.is_empty() => return Ok(Some(Literal::list(self.groups.clone()))),
            "group" => self.groups.extend(args::list(operation, args)?),
            "blank" => self.blank = args::flag(operation, args)?,
            _ => {
                return Err(DomainError::UndefinedOperation {
                    operation: operation.into(),
                    target: "unittest task".into(),
                });
            }
        }
        Ok(None)
    }

    fn params(&self, name: &str, _env: &Environment) -> StencilResult<Params> {
        let subject = name.strip_suffix(SUFFIX).unwrap_or(name);

        let mut params = Params::new();
        params.insert("name".into(), Value::String(Self::test_name(name)));
        params.insert("subject".into(), Value::String(subject.to_string()));
        params.insert(
            "extends".into(),
            Value::String(self.extends.as_deref().unwrap_or(DEFAULT_PARENT).to_string()),
        );
        params.insert("groups".into(), json!(self.groups));
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
    fn test_names_get_a_single_suffix() {
        let kind = UnittestKind::default();
        assert_eq!(kind.file_name("Foo_Bar"), Path::new("Foo/BarTest.php"));
        assert_eq!(kind.file_name("Foo_BarTest"), Path::new("Foo/BarTest.php"));
    }

    #[test]
    fn params_name_the_subject() {
        let mut kind = UnittestKind::default().group("blog");
        kind.invoke("group", &[Literal::from("blog.models")]).unwrap();

        let params = kind.params("Model_Post", &testing::env()).unwrap();
        assert_eq!(params["name"], "Model_PostTest");
        assert_eq!(params["subject"], "Model_Post");
        assert_eq!(params["extends"], "Unittest_TestCase");
        assert_eq!(params["groups"], json!(["blog", "blog.models"]));
    }
}
