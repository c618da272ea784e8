use std::collections::BTreeMap;

use super::kinds::{ClassKind, CloneKind, ControllerKind, FileKind, UnittestKind, ValuesKind};
use super::task::TaskKind;
use crate::domain::DomainError;

/// Creates a fresh, unconfigured kind.
pub type KindFactory = fn() -> Box<dyn TaskKind>;

/// Kind name → factory. Names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    factories: BTreeMap<String, KindFactory>,
}

impl KindRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register("class", || Box::new(ClassKind::default()))
            .register("clone", || Box::new(CloneKind::default()))
            .register("controller", || Box::new(ControllerKind::default()))
            .register("unittest", || Box::new(UnittestKind::default()))
            .register("file", || Box::new(FileKind::default()))
            .register("config", || Box::new(ValuesKind::config()))
            .register("message", || Box::new(ValuesKind::message()));
        registry
    }

    /// Register or replace a kind.
    pub fn register(&mut self, kind: &str, factory: KindFactory) -> &mut Self {
        self.factories.insert(kind.to_ascii_lowercase(), factory);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(&kind.to_ascii_lowercase())
    }

    /// Instantiate a kind, failing with `UnknownType` if it is not registered.
    pub fn create(&self, kind: &str) -> Result<Box<dyn TaskKind>, DomainError> {
        self.factories
            .get(&kind.to_ascii_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| DomainError::UnknownType {
                kind: kind.to_string(),
            })
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
