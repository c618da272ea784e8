//! Type definitions held in memory.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use stencil_core::{
    application::{ApplicationError, ports::TypeSource},
    domain::TypeDefinition,
    error::StencilResult,
};

/// Definitions keyed by lowercase type name.
///
/// Useful for tests and for definitions exported as JSON by another tool.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypes {
    types: Arc<RwLock<HashMap<String, TypeDefinition>>>,
}

impl InMemoryTypes {
    pub fn new(types: impl IntoIterator<Item = TypeDefinition>) -> Self {
        let store = Self::default();
        for def in types {
            store.insert(def);
        }
        store
    }

    /// Load a JSON array of definitions.
    pub fn from_json(json: &str) -> StencilResult<Self> {
        let types: Vec<TypeDefinition> =
            serde_json::from_str(json).map_err(|e| ApplicationError::SourceUnreadable {
                path: PathBuf::from("<json>"),
                reason: e.to_string(),
            })?;
        Ok(Self::new(types))
    }

    /// Add or replace a definition.
    pub fn insert(&self, def: TypeDefinition) {
        if let Ok(mut types) = self.types.write() {
            types.insert(def.name.to_ascii_lowercase(), def);
        }
    }
}

impl TypeSource for InMemoryTypes {
    fn find(&self, name: &str) -> StencilResult<Option<TypeDefinition>> {
        let types = self
            .types
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(types.get(&name.to_ascii_lowercase()).cloned())
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.types
            .read()
            .ok()?
            .get(&name.to_ascii_lowercase())
            .and_then(|def| def.file.clone())
    }
}
