//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports: the builder drives tasks
//! through their lifecycle, the introspector re-emits existing types.

pub mod builder;
pub mod environment;
pub mod introspector;

pub use builder::{Builder, BuilderId, CallOutcome, Globals, Inspection};
pub use environment::Environment;
pub use introspector::Introspector;
