//! Tera integration for template sets.
//!
//! A [`TemplateEngine`] is compiled once per template set. It holds every
//! source template and snippet under its manifest path, plus the target
//! directory and file name expressions of each file, so template errors are
//! reported when the set is loaded rather than halfway through a render.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use tera::{Context, Tera};
use tokio::fs;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::utils::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};

use super::TemplateConfig;

/// Compiled templates of one template set
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    tera: Arc<Tera>,
}

impl TemplateEngine {
    /// Read and compile every template the set references.
    ///
    /// Paths in the manifest are resolved relative to `template_dir`.
    pub async fn load(template_dir: &Path, config: &TemplateConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut templates = Vec::new();

        let referenced = config.files.iter().flat_map(|file| {
            file.snippets
                .iter()
                .chain(std::iter::once(&file.source_template))
        });
        for name in referenced {
            if !seen.insert(name.clone()) {
                continue;
            }
            let path = template_dir.join(name);
            let content = fs::read_to_string(&path).await.map_err(|e| {
                Error::template(format!(
                    "Failed to read template '{}' at {}: {e}",
                    name,
                    path.display()
                ))
            })?;
            debug!(template = %name, bytes = content.len(), "Loaded template source");
            templates.push((name.clone(), content));
        }

        for (index, file) in config.files.iter().enumerate() {
            templates.push((
                directory_template_name(index),
                normalize_path_expression(&file.target_directory),
            ));
            templates.push((
                file_name_template_name(index),
                normalize_path_expression(&file.target_file_name),
            ));
        }

        let tera = Self::compile(templates).map_err(|e| {
            Error::template(format!(
                "Failed to compile template set '{}': {}",
                config.id,
                describe(&e)
            ))
        })?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    fn compile(templates: Vec<(String, String)>) -> tera::Result<Tera> {
        let mut tera = Tera::default();
        // Generated code is never HTML
        tera.autoescape_on(vec![]);
        register_filters(&mut tera);
        tera.add_raw_templates(templates)?;
        Ok(tera)
    }

    /// Render the body of a source template
    pub fn render_body(&self, source_template: &str, context: &Context) -> Result<String> {
        self.tera.render(source_template, context).map_err(|e| {
            Error::template(format!(
                "Failed to render template '{source_template}': {}",
                describe(&e)
            ))
        })
    }

    /// Render the target directory and file name of the file at `index`
    pub fn render_target(&self, index: usize, context: &Context) -> Result<(String, String)> {
        let render = |name: String| {
            self.tera
                .render(&name, context)
                .map(|rendered| rendered.trim().to_string())
                .map_err(|e| {
                    Error::template(format!(
                        "Failed to render target path of file #{index}: {}",
                        describe(&e)
                    ))
                })
        };
        let directory = render(directory_template_name(index))?;
        let file_name = render(file_name_template_name(index))?;
        Ok((directory, file_name))
    }

    /// Names of all compiled source templates and snippets
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tera
            .get_template_names()
            .filter(|name| !name.starts_with(PATH_TEMPLATE_PREFIX))
            .collect();
        names.sort_unstable();
        names
    }
}

const PATH_TEMPLATE_PREFIX: &str = "@target/";

fn directory_template_name(index: usize) -> String {
    format!("{PATH_TEMPLATE_PREFIX}{index}/directory")
}

fn file_name_template_name(index: usize) -> String {
    format!("{PATH_TEMPLATE_PREFIX}{index}/file_name")
}

static GO_FIELD_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(-?)\s*\.([A-Za-z_][A-Za-z0-9_]*)").expect("valid field reference pattern")
});

/// Rewrites Go-style field references (`{{.Name}}`, `{{- .OperationId }}`)
/// into snake_case Tera variables (`{{ name}}`, `{{- operation_id }}`)
pub fn normalize_path_expression(expression: &str) -> String {
    GO_FIELD_REFERENCE
        .replace_all(expression, |caps: &Captures| {
            format!("{{{{{} {}", &caps[1], to_snake_case(&caps[2]))
        })
        .into_owned()
}

type FilterFn = fn(&JsonValue, &HashMap<String, JsonValue>) -> tera::Result<JsonValue>;

fn register_filters(tera: &mut Tera) {
    let filters: [(&str, FilterFn); 4] = [
        ("snake_case", |v, _| convert_case("snake_case", v, to_snake_case)),
        ("pascal_case", |v, _| convert_case("pascal_case", v, to_pascal_case)),
        ("camel_case", |v, _| convert_case("camel_case", v, to_camel_case)),
        ("kebab_case", |v, _| convert_case("kebab_case", v, to_kebab_case)),
    ];
    for (name, filter) in filters {
        tera.register_filter(name, filter);
    }
}

fn convert_case(
    filter: &str,
    value: &JsonValue,
    convert: fn(&str) -> String,
) -> tera::Result<JsonValue> {
    let text = match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        _ => {
            return Err(tera::Error::msg(format!(
                "Filter `{filter}` expects a string, number or boolean, got {value}"
            )));
        }
    };
    Ok(JsonValue::String(convert(&text)))
}

/// Tera's top-level message rarely names the cause; join the source chain
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::{TemplateFile, TemplateType};
    use tempfile::tempdir;

    fn file(source: &str, snippets: &[&str], dir: &str, name: &str) -> TemplateFile {
        TemplateFile {
            description: String::new(),
            source_template: source.to_string(),
            snippets: snippets.iter().map(|s| s.to_string()).collect(),
            target_directory: dir.to_string(),
            target_file_name: name.to_string(),
            template_type: TemplateType::ModelEach,
        }
    }

    fn config(files: Vec<TemplateFile>) -> TemplateConfig {
        TemplateConfig {
            id: "test-set".to_string(),
            description: String::new(),
            files,
        }
    }

    #[test]
    fn test_normalize_path_expression() {
        assert_eq!(normalize_path_expression("{{.Name}}.go"), "{{ name}}.go");
        assert_eq!(
            normalize_path_expression("api/{{ .OperationId }}.rs"),
            "api/{{ operation_id }}.rs"
        );
        assert_eq!(normalize_path_expression("{{- .Name -}}"), "{{- name -}}");
        assert_eq!(
            normalize_path_expression("{{ name | snake_case }}.rs"),
            "{{ name | snake_case }}.rs"
        );
        assert_eq!(normalize_path_expression("README.md"), "README.md");
    }

    #[tokio::test]
    async fn test_engine_renders_with_snippets_and_filters() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("snippets")).await.unwrap();
        fs::write(
            dir.path().join("snippets/header.tera"),
            "// generated for {{ name }}",
        )
        .await
        .unwrap();
        fs::write(
            dir.path().join("snippets/macros.tera"),
            "{% macro field(n) %}{{ n | pascal_case }}{% endmacro field %}",
        )
        .await
        .unwrap();
        fs::write(
            dir.path().join("model.go.tera"),
            "{% import \"snippets/macros.tera\" as m %}{% include \"snippets/header.tera\" %}\ntype {{ m::field(n=name) }} struct{} <{{ name }}>",
        )
        .await
        .unwrap();

        let config = config(vec![file(
            "model.go.tera",
            &["snippets/header.tera", "snippets/macros.tera"],
            "models/{{ name | kebab_case }}",
            "{{.Name}}.go",
        )]);
        let engine = TemplateEngine::load(dir.path(), &config).await.unwrap();

        let mut context = Context::new();
        context.insert("name", "pet_status");
        let body = engine.render_body("model.go.tera", &context).unwrap();
        assert_eq!(body, "// generated for pet_status\ntype PetStatus struct{} <pet_status>");

        let (directory, file_name) = engine.render_target(0, &context).unwrap();
        assert_eq!(directory, "models/pet-status");
        assert_eq!(file_name, "pet_status.go");

        assert_eq!(
            engine.template_names(),
            vec!["model.go.tera", "snippets/header.tera", "snippets/macros.tera"]
        );
    }

    #[tokio::test]
    async fn test_engine_missing_template() {
        let dir = tempdir().unwrap();
        let config = config(vec![file("missing.tera", &[], "", "x")]);
        let err = TemplateEngine::load(dir.path(), &config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read template 'missing.tera'"));
    }

    #[tokio::test]
    async fn test_engine_invalid_syntax() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.tera"), "{% if %}").await.unwrap();
        let config = config(vec![file("bad.tera", &[], "", "x")]);
        let err = TemplateEngine::load(dir.path(), &config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to compile template set 'test-set'"));
    }

    #[tokio::test]
    async fn test_engine_render_error_names_template() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("needs.tera"), "{{ missing_var }}")
            .await
            .unwrap();
        let config = config(vec![file("needs.tera", &[], "", "x")]);
        let engine = TemplateEngine::load(dir.path(), &config).await.unwrap();
        let err = engine.render_body("needs.tera", &Context::new()).unwrap_err();
        assert!(err.to_string().contains("needs.tera"));
        assert!(err.to_string().contains("missing_var"));
    }

    #[test]
    fn test_case_filter_accepts_scalars() {
        assert_eq!(
            convert_case("pascal_case", &JsonValue::from("in_stock"), to_pascal_case).unwrap(),
            "InStock"
        );
        assert_eq!(
            convert_case("pascal_case", &JsonValue::from(3), to_pascal_case).unwrap(),
            "3"
        );
        assert_eq!(
            convert_case("snake_case", &JsonValue::from(true), to_snake_case).unwrap(),
            "true"
        );

        let err = convert_case("snake_case", &serde_json::json!([1]), to_snake_case).unwrap_err();
        assert!(err.to_string().contains("expects a string, number or boolean"));
    }
}
