use serde_json::{Value, json};
use tracing::debug;

use crate::{
    application::{Environment, Introspector, ports::Params, tasks::args, tasks::task::TaskKind},
    domain::{DomainError, Literal, TypeKind},
    error::StencilResult,
};

/// A class re-emitted from the analyzed structure of an existing type.
///
/// A class source keeps its modifiers, parent and interfaces. An interface
/// source yields a concrete class implementing it. Inherited members are only
/// emitted with `inherit`, and inherited methods delegate to `parent::`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloneKind {
    source: Option<String>,
    source_kind: TypeKind,
    inherit: bool,
}

impl CloneKind {
    pub fn from_source(source: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            source: Some(source.into()),
            source_kind: kind,
            inherit: false,
        }
    }

    pub fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = inherit;
        self
    }

    fn clone_params(&self, introspector: &mut Introspector) -> StencilResult<Params> {
        let meta = introspector.analyze()?.clone();
        let from_interface = meta.is_interface();

        let (modifiers, extends, implements) = if from_interface {
            (Vec::new(), None, vec![meta.name.clone()])
        } else {
            (
                meta.modifiers.clone(),
                meta.parent.clone(),
                meta.interfaces.clone(),
            )
        };

        let emitted = |class: &str| self.inherit || class.eq_ignore_ascii_case(&meta.name);

        let mut constants = Vec::new();
        if !from_interface {
            for constant in meta.constants.iter().filter(|c| emitted(&c.class)) {
                constants.push(Value::String(introspector.constant_decl(&constant.name)?));
            }
        }

        let mut properties = Vec::new();
        for property in meta.properties.iter().filter(|p| emitted(&p.class)) {
            properties.push(json!({
                "declaration": introspector.property_decl(&property.name)?,
                "doc_comment": property.doc_comment,
            }));
        }

        let mut methods = Vec::new();
        for method in &meta.methods {
            let own = method.class.eq_ignore_ascii_case(&meta.name);
            if !(own || from_interface || self.inherit) {
                continue;
            }
            let declared_by_interface = from_interface
                || meta
                    .interfaces
                    .iter()
                    .any(|i| i.eq_ignore_ascii_case(&method.class));

            let body = if method.is_abstract {
                None
            } else if own || declared_by_interface {
                Some(String::new())
            } else if method.is_private || method.is_final {
                continue;
            } else {
                Some(format!(
                    "return parent::{};",
                    introspector.method_invocation(&method.name)?
                ))
            };

            methods.push(json!({
                "name": method.name,
                "signature": introspector.method_signature(&method.name)?,
                "abstract": method.is_abstract,
                "body": body,
                "doc_comment": method.doc_comment,
            }));
        }

        debug!(
            source = %meta.name,
            constants = constants.len(),
            properties = properties.len(),
            methods = methods.len(),
            "Clone parameters resolved"
        );

        let mut params = Params::new();
        params.insert("source".into(), Value::String(meta.name.clone()));
        params.insert("modifiers".into(), Value::String(modifiers.join(" ")));
        params.insert("extends".into(), extends.map_or(Value::Null, Value::String));
        params.insert("implements".into(), json!(implements));
        params.insert("doc_comment".into(), json!(meta.doc_comment));
        params.insert("constants".into(), Value::Array(constants));
        params.insert("properties".into(), Value::Array(properties));
        params.insert("methods".into(), Value::Array(methods));
        Ok(params)
    }
}

impl TaskKind for CloneKind {
    fn kind(&self) -> &'static str {
        "clone"
    }

    fn template(&self) -> Option<&'static str> {
        Some("clone")
    }

    fn supports(&self, operation: &str) -> bool {
        matches!(operation, "source" | "type" | "inherit")
    }

    fn invoke(
        &mut self,
        operation: &str,
        args: &[Literal],
    ) -> Result<Option<Literal>, DomainError> {
        match operation {
            "source" => match args::optional_text(operation, args)? {
                Some(source) => self.source = Some(source),
                None => return Ok(Some(self.source.clone().map_or(Literal::Null, Literal::from))),
            },
            "type" => match args::optional_text(operation, args)? {
                Some(kind) => self.source_kind = kind.parse()?,
                None => return Ok(Some(Literal::from(self.source_kind.to_string()))),
            },
            "inherit" => self.inherit = args::flag(operation, args)?,
            _ => {
                return Err(DomainError::UndefinedOperation {
                    operation: operation.into(),
                    target: "clone task".into(),
                });
            }
        }
        Ok(None)
    }

    fn params(&self, _name: &str, env: &Environment) -> StencilResult<Params> {
        let source = self.source.as_deref().ok_or(DomainError::MissingSource)?;
        let mut introspector = env.introspector(source, self.source_kind);
        self.clone_params(&mut introspector)
    }
}
