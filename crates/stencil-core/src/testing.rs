//! In-process fakes of the ports, for unit tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::{
    application::{
        ApplicationError, Environment,
        ports::{ArtifactStore, ConfigSource, Params, PathResolver, TemplateRenderer, TypeSource},
    },
    domain::{DomainError, TypeDefinition},
    error::StencilResult,
};

/// Files kept in memory. Directories exist when a file lives below them.
#[derive(Debug, Default)]
pub struct FakeStore {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl ArtifactStore for FakeStore {
    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| files.keys().any(|file| file.starts_with(path)))
            .unwrap_or(false)
    }

    fn write(&self, path: &Path, content: &str) -> StencilResult<()> {
        self.files
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn delete(&self, path: &Path) -> StencilResult<()> {
        self.files
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .remove(path);
        Ok(())
    }
}

/// Renders `<template>:<params as JSON>`.
#[derive(Debug, Default)]
pub struct EchoRenderer;

impl TemplateRenderer for EchoRenderer {
    fn render(&self, template: &str, params: &Params) -> StencilResult<String> {
        Ok(format!("{template}:{}", Value::Object(params.clone())))
    }
}

/// Application root `/app`, modules under `/modules`.
#[derive(Debug)]
pub struct FixedPaths {
    known: BTreeSet<String>,
}

impl Default for FixedPaths {
    fn default() -> Self {
        Self {
            known: ["blog", "news"].into_iter().map(str::to_string).collect(),
        }
    }
}

impl PathResolver for FixedPaths {
    fn app_root(&self) -> PathBuf {
        PathBuf::from("/app")
    }

    fn module_path(
        &self,
        module: &str,
        verify: bool,
        base: Option<&Path>,
    ) -> StencilResult<PathBuf> {
        if verify && !self.known.contains(module) {
            return Err(DomainError::ModuleNotFound {
                module: module.to_string(),
            }
            .into());
        }
        Ok(base.unwrap_or(Path::new("/modules")).join(module))
    }
}

/// Type definitions keyed by lowercase name.
#[derive(Debug, Default)]
pub struct StaticTypes {
    types: HashMap<String, TypeDefinition>,
}

impl StaticTypes {
    pub fn new(types: impl IntoIterator<Item = TypeDefinition>) -> Self {
        Self {
            types: types
                .into_iter()
                .map(|def| (def.name.to_ascii_lowercase(), def))
                .collect(),
        }
    }
}

impl TypeSource for StaticTypes {
    fn find(&self, name: &str) -> StencilResult<Option<TypeDefinition>> {
        Ok(self.types.get(&name.to_ascii_lowercase()).cloned())
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.types
            .get(&name.to_ascii_lowercase())
            .and_then(|def| def.file.clone())
    }
}

/// One JSON document answering every source name.
#[derive(Debug, Default)]
pub struct StaticConfig(pub Value);

impl ConfigSource for StaticConfig {
    fn get(&self, _source: &str, key: Option<&str>) -> StencilResult<Option<Value>> {
        let mut current = &self.0;
        if let Some(key) = key {
            for segment in key.split('.') {
                match current.get(segment) {
                    Some(next) => current = next,
                    None => return Ok(None),
                }
            }
        }
        Ok((!current.is_null()).then(|| current.clone()))
    }
}

fn assemble(
    store: Arc<dyn ArtifactStore>,
    types: Arc<dyn TypeSource>,
    config: Value,
) -> Environment {
    Environment::new(
        store,
        Arc::new(EchoRenderer),
        Arc::new(FixedPaths::default()),
        types,
        Arc::new(StaticConfig(config)),
    )
}

pub fn env() -> Environment {
    assemble(
        Arc::new(FakeStore::default()),
        Arc::new(StaticTypes::default()),
        Value::Null,
    )
}

pub fn env_with_store(store: Arc<dyn ArtifactStore>) -> Environment {
    assemble(store, Arc::new(StaticTypes::default()), Value::Null)
}

pub fn env_with_types(types: Arc<StaticTypes>) -> Environment {
    assemble(Arc::new(FakeStore::default()), types, Value::Null)
}

pub fn env_with_config(config: Value) -> Environment {
    assemble(
        Arc::new(FakeStore::default()),
        Arc::new(StaticTypes::default()),
        config,
    )
}
