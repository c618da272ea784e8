//! Handlebars renderer with the built-in PHP templates.
//!
//! Templates are registered under an id (`class`, `clone`, ...). A template
//! directory can add or override ids: `<dir>/class.hbs` replaces `class`,
//! `<dir>/model/orm.hbs` registers `model/orm`.

use std::path::Path;

use chrono::Datelike;
use handlebars::Handlebars;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use stencil_core::{
    application::{
        ApplicationError,
        ports::{Params, TemplateRenderer},
    },
    error::{StencilError, StencilResult},
};

/// Built-in templates as `(id, source)`.
pub const BUILTIN_TEMPLATES: [(&str, &str); 12] = [
    ("class", include_str!("templates/class.hbs")),
    ("clone", include_str!("templates/clone.hbs")),
    ("controller", include_str!("templates/controller.hbs")),
    ("unittest", include_str!("templates/unittest.hbs")),
    ("config", include_str!("templates/config.hbs")),
    ("module/init", include_str!("templates/module/init.hbs")),
    ("module/readme", include_str!("templates/module/readme.hbs")),
    ("module/license", include_str!("templates/module/license.hbs")),
    ("module/userguide", include_str!("templates/module/userguide.hbs")),
    ("module/guide/menu", include_str!("templates/module/guide/menu.hbs")),
    ("module/guide/index", include_str!("templates/module/guide/index.hbs")),
    ("module/guide/start", include_str!("templates/module/guide/start.hbs")),
];

const EXTENSION: &str = "hbs";

/// Template renderer backed by `handlebars`. Output is not HTML-escaped.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsRenderer")
            .field("templates", &self.templates())
            .finish()
    }
}

impl HandlebarsRenderer {
    /// A renderer with the built-in templates and helpers registered.
    pub fn new() -> StencilResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("year", Box::new(year_helper));
        registry.register_helper("join", Box::new(join_helper));

        for (id, source) in BUILTIN_TEMPLATES {
            registry
                .register_template_string(id, source)
                .map_err(|e| StencilError::Internal {
                    message: format!("built-in template '{id}' does not compile: {e}"),
                })?;
        }
        Ok(Self { registry })
    }

    /// Register or replace the template `id`.
    pub fn register(&mut self, id: &str, source: &str) -> StencilResult<()> {
        self.registry
            .register_template_string(id, source)
            .map_err(|e| ApplicationError::RenderingFailed {
                template: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Register every `*.hbs` file under `dir`, named by its relative path
    /// without extension.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&mut self, dir: &Path) -> StencilResult<usize> {
        if !dir.is_dir() {
            return Err(StencilError::Configuration {
                message: format!("templates directory {} not found", dir.display()),
            });
        }

        let mut count = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::SourceUnreadable {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION)
            {
                continue;
            }

            let id = template_id(dir, path);
            let source =
                std::fs::read_to_string(path).map_err(|e| ApplicationError::SourceUnreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            self.register(&id, &source)?;
            debug!(id = %id, "Registered template");
            count += 1;
        }
        Ok(count)
    }

    pub fn has_template(&self, id: &str) -> bool {
        self.registry.has_template(id)
    }

    /// Registered template ids, sorted.
    pub fn templates(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.registry.get_templates().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    #[instrument(skip(self, params))]
    fn render(&self, template: &str, params: &Params) -> StencilResult<String> {
        if !self.has_template(template) {
            return Err(ApplicationError::RenderingFailed {
                template: template.to_string(),
                reason: "no such template".into(),
            }
            .into());
        }

        Ok(self
            .registry
            .render(template, params)
            .map_err(|e| ApplicationError::RenderingFailed {
                template: template.to_string(),
                reason: e.to_string(),
            })?)
    }
}

fn template_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// Handlebars helpers

fn year_helper(
    _: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&chrono::Local::now().year().to_string())?;
    Ok(())
}

fn join_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let separator = h.param(1).and_then(|v| v.value().as_str()).unwrap_or(", ");
    if let Some(items) = h.param(0).and_then(|v| v.value().as_array()) {
        let joined = items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join(separator);
        out.write(&joined)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn params(value: serde_json::Value) -> Params {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Params::new(),
        }
    }

    #[test]
    fn class_template_renders_declaration() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let out = renderer
            .render(
                "class",
                &params(json!({
                    "name": "Model_Post",
                    "extends": "ORM",
                    "implements": ["Countable", "ArrayAccess"],
                    "abstract": true,
                    "blank": false,
                })),
            )
            .unwrap();

        assert!(out.starts_with("<?php defined('SYSPATH')"));
        assert!(out.contains(
            "abstract class Model_Post extends ORM implements Countable, ArrayAccess {"
        ));
        assert!(out.contains("} // End Model_Post"));
    }

    #[test]
    fn output_is_not_html_escaped() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let out = renderer
            .render(
                "config",
                &params(json!({"export": "array(\n\t'a' => 'b',\n)"})),
            )
            .unwrap();
        assert!(out.contains("return array(\n\t'a' => 'b',\n);"));
    }

    #[test]
    fn clone_template_renders_members() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let out = renderer
            .render(
                "clone",
                &params(json!({
                    "name": "Cache_Memory",
                    "modifiers": "",
                    "extends": "Kohana_Cache",
                    "implements": [],
                    "constants": ["const EXT = '.cache'"],
                    "properties": [{"declaration": "protected $_config = array()"}],
                    "methods": [
                        {"signature": "public function get($id)", "abstract": false,
                         "body": "return parent::get($id);"},
                        {"signature": "abstract public function delete($id)", "abstract": true,
                         "body": null},
                    ],
                })),
            )
            .unwrap();

        assert!(out.contains("class Cache_Memory extends Kohana_Cache {"));
        assert!(out.contains("const EXT = '.cache';"));
        assert!(out.contains("protected $_config = array();"));
        assert!(out.contains("return parent::get($id);"));
        assert!(out.contains("abstract public function delete($id);"));
    }

    #[test]
    fn module_templates_use_the_module_name() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let p = params(json!({"name": "config/userguide.php", "module": "blog"}));

        let guide = renderer.render("module/userguide", &p).unwrap();
        assert!(guide.contains("'blog' => array("));
        assert!(guide.contains("'description' => 'The blog module.',"));

        let readme = renderer.render("module/readme", &p).unwrap();
        assert!(readme.starts_with("# blog\n"));
        assert!(readme.contains("'blog' => MODPATH.'blog',"));
    }

    #[test]
    fn unknown_template_fails() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let err = renderer.render("widget", &Params::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template rendering failed for 'widget': no such template"
        );
    }

    #[test]
    fn template_dir_overrides_builtins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("class.hbs"), "custom {{name}}").unwrap();
        std::fs::create_dir(temp.path().join("model")).unwrap();
        std::fs::write(temp.path().join("model/orm.hbs"), "orm {{name}}").unwrap();
        std::fs::write(temp.path().join("README.md"), "ignored").unwrap();

        let mut renderer = HandlebarsRenderer::new().unwrap();
        assert_eq!(renderer.load_dir(temp.path()).unwrap(), 2);

        let p = params(json!({"name": "Foo"}));
        assert_eq!(renderer.render("class", &p).unwrap(), "custom Foo");
        assert_eq!(renderer.render("model/orm", &p).unwrap(), "orm Foo");
        assert!(renderer.templates().contains(&"controller".to_string()));
    }

    #[test]
    fn missing_template_dir_is_reported() {
        let mut renderer = HandlebarsRenderer::new().unwrap();
        let err = renderer.load_dir(Path::new("/does/not/exist")).unwrap_err();
        assert!(matches!(err, StencilError::Configuration { .. }));
    }
}
