//! Application layer for Stencil.
//!
//! This layer contains:
//! - **Services**: orchestration (Builder, Environment, Introspector)
//! - **Tasks**: generation tasks and the registry of task kinds
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Generator rules (naming, literals, metadata) live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;
pub mod tasks;

pub use services::{Builder, BuilderId, CallOutcome, Environment, Globals, Inspection, Introspector};
pub use tasks::{KindRegistry, Task, TaskKind};

pub use error::ApplicationError;
