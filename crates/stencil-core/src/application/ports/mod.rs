//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stencil-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ArtifactStore`: existence checks, writes, deletes
//!   - `TemplateRenderer`: template id + parameters to text
//!   - `PathResolver`: application root and module directories
//!   - `TypeSource`: statically extracted type definitions
//!   - `ConfigSource`: configuration/message lookups
//!
//! - **Driving (Input) Ports**: the `Builder` API itself, driven by the CLI

pub mod output;

pub use output::{ArtifactStore, ConfigSource, Params, PathResolver, TemplateRenderer, TypeSource};

#[cfg(test)]
pub use output::{MockArtifactStore, MockTemplateRenderer};
