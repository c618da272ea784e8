//! Introspector - analyzes an existing type and re-emits declarations.
//!
//! Analysis reads the source's [`TypeDefinition`] and those of its ancestors
//! and interfaces from a [`TypeSource`], merges inherited members the source
//! does not redeclare, and caches the resulting [`TypeMetadata`] until the
//! source or kind changes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::ports::TypeSource,
    domain::{
        ConstantInfo, DomainError, Literal, Member, MethodDefinition, MethodInfo, ParamInfo,
        PropertyInfo, TypeDefinition, TypeKind, TypeMetadata, canonical_modifiers,
    },
    error::StencilResult,
};

/// Analyzes one source type at a time.
pub struct Introspector {
    types: Arc<dyn TypeSource>,
    source: Option<String>,
    kind: TypeKind,
    info: Option<TypeMetadata>,
}

impl std::fmt::Debug for Introspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Introspector")
            .field("source", &self.source)
            .field("kind", &self.kind)
            .field("analyzed", &self.info.is_some())
            .finish_non_exhaustive()
    }
}

impl Introspector {
    /// Create an introspector with no source, analyzing classes.
    pub fn new(types: Arc<dyn TypeSource>) -> Self {
        Self {
            types,
            source: None,
            kind: TypeKind::Class,
            info: None,
        }
    }

    /// Create an introspector bound to `source`.
    pub fn for_source(types: Arc<dyn TypeSource>, source: impl Into<String>, kind: TypeKind) -> Self {
        let mut introspector = Self::new(types);
        introspector.set_source(source).set_kind(kind);
        introspector
    }

    /// Bind a new source type. Cached metadata is dropped when it changes.
    pub fn set_source(&mut self, source: impl Into<String>) -> &mut Self {
        let source = source.into();
        if self.source.as_deref() != Some(source.as_str()) {
            self.source = Some(source);
            self.info = None;
        }
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Choose class or interface analysis. Cached metadata is dropped when it changes.
    pub fn set_kind(&mut self, kind: TypeKind) -> &mut Self {
        if self.kind != kind {
            self.kind = kind;
            self.info = None;
        }
        self
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Whether metadata is cached for the current (source, kind).
    pub fn is_analyzed(&self) -> bool {
        self.info.is_some()
    }

    /// Whether the source type is known to the type source.
    pub fn exists(&self) -> StencilResult<bool> {
        let source = self.source.as_deref().ok_or(DomainError::MissingSource)?;
        Ok(self.types.find(source)?.is_some())
    }

    /// Analyze the source, or return the cached metadata.
    #[instrument(skip(self), fields(source = ?self.source, kind = %self.kind))]
    pub fn analyze(&mut self) -> StencilResult<&TypeMetadata> {
        let info = match self.info.take() {
            Some(info) => info,
            None => self.extract()?,
        };
        Ok(self.info.insert(info))
    }

    // -------------------------------------------------------------------------
    // Accessors (lazily analyze)
    // -------------------------------------------------------------------------

    pub fn is_abstract(&mut self) -> StencilResult<bool> {
        Ok(self.analyze()?.is_abstract)
    }

    pub fn modifiers(&mut self) -> StencilResult<Vec<String>> {
        Ok(self.analyze()?.modifiers.clone())
    }

    pub fn parent(&mut self) -> StencilResult<Option<String>> {
        Ok(self.analyze()?.parent.clone())
    }

    pub fn interfaces(&mut self) -> StencilResult<Vec<String>> {
        Ok(self.analyze()?.interfaces.clone())
    }

    pub fn constants(&mut self) -> StencilResult<&[ConstantInfo]> {
        Ok(&self.analyze()?.constants)
    }

    pub fn properties(&mut self) -> StencilResult<&[PropertyInfo]> {
        Ok(&self.analyze()?.properties)
    }

    pub fn methods(&mut self) -> StencilResult<&[MethodInfo]> {
        Ok(&self.analyze()?.methods)
    }

    pub fn doc_comment(&mut self) -> StencilResult<Option<String>> {
        Ok(self.analyze()?.doc_comment.clone())
    }

    // -------------------------------------------------------------------------
    // Declaration builders
    // -------------------------------------------------------------------------

    /// `const NAME = value`
    pub fn constant_decl(&mut self, name: &str) -> StencilResult<String> {
        let constant = self
            .analyze()?
            .constant(name)
            .ok_or_else(|| DomainError::not_found(Member::Constant { name: name.into() }))?;
        Ok(format!("const {} = {}", constant.name, constant.value.export()))
    }

    /// `<modifiers> $name< = default>`
    pub fn property_decl(&mut self, name: &str) -> StencilResult<String> {
        let property = self
            .analyze()?
            .property(name)
            .ok_or_else(|| DomainError::not_found(Member::Property { name: name.into() }))?;

        let mut decl = String::new();
        if !property.modifiers.is_empty() {
            decl.push_str(&property.modifiers);
            decl.push(' ');
        }
        decl.push('$');
        decl.push_str(&property.name);
        if let Some(value) = &property.value {
            decl.push_str(" = ");
            decl.push_str(value);
        }
        Ok(decl)
    }

    /// `<type ><&>$name< = default>`; the type only appears when hinted.
    pub fn param_signature(&mut self, method: &str, param: &str) -> StencilResult<String> {
        let info = self.method_info(method)?;
        let param_info = info.param(param).ok_or_else(|| {
            DomainError::not_found(Member::Param {
                method: method.into(),
                name: param.into(),
            })
        })?;
        Ok(render_param(param_info))
    }

    /// Comma-joined parameter signatures in declared order.
    pub fn method_param_signatures(&mut self, method: &str) -> StencilResult<String> {
        let info = self.method_info(method)?;
        Ok(info
            .params
            .iter()
            .map(render_param)
            .collect::<Vec<_>>()
            .join(", "))
    }

    /// `<modifiers> function <&>name(<params>)`
    pub fn method_signature(&mut self, method: &str) -> StencilResult<String> {
        let params = self.method_param_signatures(method)?;
        let info = self.method_info(method)?;

        let mut signature = String::new();
        if !info.modifiers.is_empty() {
            signature.push_str(&info.modifiers);
            signature.push(' ');
        }
        signature.push_str("function ");
        if info.by_ref {
            signature.push('&');
        }
        signature.push_str(&info.name);
        signature.push('(');
        signature.push_str(&params);
        signature.push(')');
        Ok(signature)
    }

    /// `name($a, $b)`, for delegating bodies.
    pub fn method_invocation(&mut self, method: &str) -> StencilResult<String> {
        let info = self.method_info(method)?;
        let args = info
            .params
            .iter()
            .map(|p| format!("${}", p.name))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("{}({})", info.name, args))
    }

    fn method_info(&mut self, method: &str) -> StencilResult<&MethodInfo> {
        Ok(self
            .analyze()?
            .method(method)
            .ok_or_else(|| DomainError::not_found(Member::Method { name: method.into() }))?)
    }

    // -------------------------------------------------------------------------
    // Extraction
    // -------------------------------------------------------------------------

    fn extract(&self) -> StencilResult<TypeMetadata> {
        let source = self.source.as_deref().ok_or(DomainError::MissingSource)?;
        let definition = self
            .types
            .find(source)?
            .ok_or_else(|| DomainError::not_found(Member::Type { name: source.into() }))?;

        let lineage = self.lineage(&definition)?;
        let is_abstract = self.kind == TypeKind::Class && definition.has_modifier("abstract");

        let mut interfaces: Vec<String> = Vec::new();
        let mut constants: Vec<ConstantInfo> = Vec::new();
        let mut properties: Vec<PropertyInfo> = Vec::new();
        let mut methods: Vec<MethodInfo> = Vec::new();

        for (depth, declaring) in lineage.iter().enumerate() {
            let inherited = depth > 0;

            let implemented = if declaring.kind == TypeKind::Interface && inherited {
                // an interface reached through the lineage is itself implemented
                std::iter::once(&declaring.name)
                    .chain(declaring.interfaces.iter())
                    .collect::<Vec<_>>()
            } else {
                declaring.interfaces.iter().collect()
            };
            for name in implemented {
                if !interfaces.iter().any(|i| i.eq_ignore_ascii_case(name)) {
                    interfaces.push(name.clone());
                }
            }

            for constant in &declaring.constants {
                if constants.iter().all(|c| c.name != constant.name) {
                    constants.push(ConstantInfo {
                        name: constant.name.clone(),
                        class: declaring.name.clone(),
                        value: constant.value.clone(),
                    });
                }
            }

            for property in &declaring.properties {
                let is_private = property.has_modifier("private");
                if inherited && is_private {
                    continue;
                }
                if properties.iter().any(|p| p.name == property.name) {
                    continue;
                }
                properties.push(PropertyInfo {
                    name: property.name.clone(),
                    class: declaring.name.clone(),
                    modifiers: canonical_modifiers(&property.modifiers).join(" "),
                    value: property
                        .default
                        .as_ref()
                        .filter(|value| !value.is_null() && !matches!(value, Literal::Object(_)))
                        .map(Literal::export),
                    type_name: property
                        .default
                        .as_ref()
                        .map_or("any", Literal::infer_type)
                        .to_string(),
                    is_private,
                    doc_comment: property.doc_comment.clone(),
                });
            }

            for method in &declaring.methods {
                if methods.iter().any(|m| m.name.eq_ignore_ascii_case(&method.name)) {
                    continue;
                }
                let mut info = method_info(declaring, method);
                if !is_abstract && info.is_abstract {
                    info.make_concrete();
                }
                methods.push(info);
            }
        }

        debug!(
            constants = constants.len(),
            properties = properties.len(),
            methods = methods.len(),
            ancestors = lineage.len() - 1,
            "Type analyzed"
        );

        Ok(TypeMetadata {
            name: definition.name.clone(),
            kind: self.kind,
            modifiers: canonical_modifiers(&definition.modifiers),
            is_abstract,
            parent: definition.parent.clone(),
            interfaces,
            constants,
            properties,
            methods,
            doc_comment: definition.doc_comment.clone(),
        })
    }

    /// The definition followed by its ancestors, then every interface
    /// reachable from any of them. Unknown ancestors are skipped.
    fn lineage(&self, definition: &TypeDefinition) -> StencilResult<Vec<TypeDefinition>> {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(definition.name.to_ascii_lowercase());

        let mut classes = vec![definition.clone()];
        let mut next_parent = definition.parent.clone();
        while let Some(parent) = next_parent.take() {
            if !seen.insert(parent.to_ascii_lowercase()) {
                break;
            }
            match self.types.find(&parent)? {
                Some(found) => {
                    next_parent = found.parent.clone();
                    classes.push(found);
                }
                None => debug!(parent = %parent, "Ancestor not found, skipping"),
            }
        }

        let mut pending: Vec<String> = classes
            .iter()
            .flat_map(|c| c.interfaces.iter().cloned())
            .collect();
        let mut interfaces = Vec::new();
        while !pending.is_empty() {
            let name = pending.remove(0);
            if !seen.insert(name.to_ascii_lowercase()) {
                continue;
            }
            match self.types.find(&name)? {
                Some(found) => {
                    pending.extend(found.interfaces.iter().cloned());
                    interfaces.push(found);
                }
                None => debug!(interface = %name, "Interface not found, skipping"),
            }
        }

        classes.extend(interfaces);
        Ok(classes)
    }
}

fn method_info(declaring: &TypeDefinition, method: &MethodDefinition) -> MethodInfo {
    let in_interface = declaring.kind == TypeKind::Interface;
    let is_abstract = in_interface || method.has_modifier("abstract");

    let mut modifiers = method.modifiers.clone();
    if is_abstract && !method.has_modifier("abstract") {
        modifiers.push("abstract".into());
    }
    if in_interface && !modifiers.iter().any(|m| m.eq_ignore_ascii_case("public")) {
        modifiers.push("public".into());
    }

    MethodInfo {
        name: method.name.clone(),
        class: declaring.name.clone(),
        modifiers: canonical_modifiers(&modifiers).join(" "),
        by_ref: method.by_ref,
        is_abstract,
        is_final: method.has_modifier("final"),
        is_private: method.has_modifier("private"),
        params: method
            .params
            .iter()
            .map(|param| ParamInfo {
                name: param.name.clone(),
                type_name: param
                    .hint
                    .clone()
                    .or_else(|| param.default.as_ref().map(|d| d.infer_type().to_string()))
                    .unwrap_or_else(|| "any".to_string()),
                hint: param.hint.is_some(),
                default: param.default.as_ref().map(Literal::export),
                by_ref: param.by_ref,
            })
            .collect(),
        doc_comment: method.doc_comment.clone(),
    }
}

fn render_param(param: &ParamInfo) -> String {
    let mut signature = String::new();
    if param.hint {
        signature.push_str(&param.type_name);
        signature.push(' ');
    }
    if param.by_ref {
        signature.push('&');
    }
    signature.push('$');
    signature.push_str(&param.name);
    if let Some(default) = &param.default {
        signature.push_str(" = ");
        signature.push_str(default);
    }
    signature
}
