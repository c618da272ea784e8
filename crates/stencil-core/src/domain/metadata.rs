//! Type metadata.
//!
//! Two shapes live here:
//!
//! - [`TypeDefinition`]: what a static extraction pass reads from one source
//!   declaration (declared members only, no inheritance applied).
//! - [`TypeMetadata`]: the analyzed snapshot the introspector produces from a
//!   definition and its ancestors, ready for re-emission.
//!
//! Both are plain serde value objects; the definition is the boundary between
//! the extraction step and re-emission.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DomainError, Literal};

/// Whether a type is analyzed as a class or an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Interface => write!(f, "interface"),
        }
    }
}

impl FromStr for TypeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "interface" => Ok(Self::Interface),
            other => Err(DomainError::InvalidArgument {
                operation: "type".into(),
                reason: format!("expected 'class' or 'interface', got '{other}'"),
            }),
        }
    }
}

// ============================================================================
// Extracted definitions
// ============================================================================

/// A type declaration as written in source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    /// Declared modifiers such as `abstract` or `final`.
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    /// Implemented interfaces, or extended interfaces for an interface.
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub constants: Vec<ConstantDefinition>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub methods: Vec<MethodDefinition>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    /// File the declaration was read from.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantDefinition {
    pub name: String,
    pub value: Literal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub default: Option<Literal>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Returns by reference (`function &name()`).
    #[serde(default)]
    pub by_ref: bool,
    #[serde(default)]
    pub params: Vec<ParamDefinition>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub name: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub default: Option<Literal>,
    #[serde(default)]
    pub by_ref: bool,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m.eq_ignore_ascii_case(modifier))
    }

    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m.eq_ignore_ascii_case(modifier))
    }
}

impl PropertyDefinition {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m.eq_ignore_ascii_case(modifier))
    }
}

// ============================================================================
// Analyzed metadata
// ============================================================================

/// Immutable snapshot of an analyzed type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMetadata {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    /// Always false when analyzed as an interface.
    pub is_abstract: bool,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub constants: Vec<ConstantInfo>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantInfo {
    pub name: String,
    /// Declaring type.
    pub class: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    /// Declaring type.
    pub class: String,
    pub modifiers: String,
    /// Exported default, absent when the default is null, an object or missing.
    pub value: Option<String>,
    pub type_name: String,
    pub is_private: bool,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// Declaring type.
    pub class: String,
    pub modifiers: String,
    pub by_ref: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_private: bool,
    /// Parameters in declared order.
    pub params: Vec<ParamInfo>,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    /// Hinted type, else inferred from the default, else `any`.
    pub type_name: String,
    /// Whether `type_name` came from an explicit hint.
    pub hint: bool,
    /// Exported default value.
    pub default: Option<String>,
    pub by_ref: bool,
}

impl TypeMetadata {
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn constant(&self, name: &str) -> Option<&ConstantInfo> {
        self.constants.iter().find(|c| c.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Method names compare case-insensitively.
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

impl MethodInfo {
    pub fn param(&self, name: &str) -> Option<&ParamInfo> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Strip `abstract` so the method can be re-emitted with a body.
    pub fn make_concrete(&mut self) {
        self.is_abstract = false;
        self.modifiers = self
            .modifiers
            .split_whitespace()
            .filter(|m| !m.eq_ignore_ascii_case("abstract"))
            .collect::<Vec<_>>()
            .join(" ");
    }
}

/// Order modifiers the way reflection reports them:
/// `abstract`, `final`, visibility, `static`, `readonly`.
pub fn canonical_modifiers<S: AsRef<str>>(modifiers: &[S]) -> Vec<String> {
    const ORDER: [&str; 7] = [
        "abstract",
        "final",
        "public",
        "protected",
        "private",
        "static",
        "readonly",
    ];

    let mut present: Vec<String> = Vec::new();
    for name in ORDER {
        if modifiers.iter().any(|m| m.as_ref().eq_ignore_ascii_case(name)) {
            present.push(name.to_string());
        }
    }
    present
}
