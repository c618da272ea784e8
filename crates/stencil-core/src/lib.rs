//! Stencil Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Stencil
//! code scaffolding engine, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stencil-cli (CLI)             │
//! │   (class / controller / config cmds)    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (Builder, Task, Introspector, Kinds)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │ (ArtifactStore, TemplateRenderer, ...)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    stencil-adapters (Infrastructure)    │
//! │ (LocalFilesystem, HandlebarsRenderer)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (Literal, TypeMetadata, LogEntry)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stencil_core::prelude::*;
//!
//! # fn demo(env: Environment) -> StencilResult<()> {
//! let mut builder = env.build();
//! builder.with_pretend(true).with_module("blog");
//!
//! builder.add_task("class", Some("Model_Post"))?;
//! builder.call("extend", &[Literal::from("ORM")])?;
//!
//! builder.execute(Command::Create)?;
//! for entry in builder.get_log() {
//!     println!("{} {}", entry.status, entry.item.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

#[cfg(test)]
pub(crate) mod testing;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Builder, BuilderId, CallOutcome, Environment, Globals, Inspection, Introspector,
        KindRegistry, Task, TaskKind,
        ports::{ArtifactStore, ConfigSource, Params, PathResolver, TemplateRenderer, TypeSource},
    };
    pub use crate::domain::{
        Command, LogEntry, Literal, TypeDefinition, TypeKind, TypeMetadata, export_value,
        parse_literal,
    };
    pub use crate::error::{StencilError, StencilResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
