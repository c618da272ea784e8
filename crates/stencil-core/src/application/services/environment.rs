//! Environment - the collaborators shared by builders.

use std::fmt;
use std::sync::Arc;

use crate::{
    application::{
        ports::{ArtifactStore, ConfigSource, Params, PathResolver, TemplateRenderer, TypeSource},
        services::{Builder, Introspector},
        tasks::KindRegistry,
    },
    domain::TypeKind,
    error::StencilResult,
};

/// Ports plus the kind registry. Cheap to clone.
#[derive(Clone)]
pub struct Environment {
    store: Arc<dyn ArtifactStore>,
    renderer: Arc<dyn TemplateRenderer>,
    paths: Arc<dyn PathResolver>,
    types: Arc<dyn TypeSource>,
    config: Arc<dyn ConfigSource>,
    registry: Arc<KindRegistry>,
}

impl Environment {
    /// Create an environment with the standard kinds registered.
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        renderer: Arc<dyn TemplateRenderer>,
        paths: Arc<dyn PathResolver>,
        types: Arc<dyn TypeSource>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        Self {
            store,
            renderer,
            paths,
            types,
            config,
            registry: Arc::new(KindRegistry::standard()),
        }
    }

    /// A new, empty builder bound to this environment.
    pub fn build(&self) -> Builder {
        Builder::new(self.clone())
    }

    /// An introspector for `source` reading from this environment's types.
    pub fn introspector(&self, source: &str, kind: TypeKind) -> Introspector {
        Introspector::for_source(Arc::clone(&self.types), source, kind)
    }

    /// Generator defaults for `kind`, read from `defaults.<kind>` of the
    /// named configuration source. Missing or non-table values yield none.
    pub fn config_defaults(&self, source: &str, kind: &str) -> StencilResult<Params> {
        let key = format!("defaults.{kind}");
        Ok(match self.config.get(source, Some(&key))? {
            Some(serde_json::Value::Object(map)) => map,
            _ => Params::new(),
        })
    }

    pub fn store(&self) -> &dyn ArtifactStore {
        self.store.as_ref()
    }

    pub fn renderer(&self) -> &dyn TemplateRenderer {
        self.renderer.as_ref()
    }

    pub fn paths(&self) -> &dyn PathResolver {
        self.paths.as_ref()
    }

    pub fn types(&self) -> &dyn TypeSource {
        self.types.as_ref()
    }

    pub fn config(&self) -> &dyn ConfigSource {
        self.config.as_ref()
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("app_root", &self.paths.app_root())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
