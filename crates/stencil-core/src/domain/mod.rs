// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stencil.
//!
//! Pure value types with no I/O: source literals and their exporter/parser,
//! the type metadata model, naming conventions, and the action log.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No I/O**: No filesystem, network, or external calls
//! - **Minimal crates**: std library, thiserror, serde
//! - **Immutable values**: All domain objects are Clone + PartialEq
pub mod error;
pub mod literal;
pub mod log;
pub mod metadata;
pub mod naming;

pub use error::{DomainError, ErrorCategory, Member, interpolate};
pub use literal::{ArrayKey, Literal, export_value, infer_type, parse_literal, parse_prefix};
pub use log::{Command, LogEntry};
pub use metadata::{
    ConstantDefinition, ConstantInfo, MethodDefinition, MethodInfo, ParamDefinition, ParamInfo,
    PropertyDefinition, PropertyInfo, TypeDefinition, TypeKind, TypeMetadata, canonical_modifiers,
};
