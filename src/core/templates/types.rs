//! Template set configuration model and render outcome types.
//!
//! A template set ([`TemplateConfig`]) is a named, ordered list of
//! [`TemplateFile`]s. Each file declares a [`TemplateType`] that controls how
//! many times it is rendered against a specification document. A render pass
//! is parameterized by [`RenderOpts`] and reports one [`RenderedFile`] per
//! file considered, classified by [`FileState`].
//!
//! # Examples
//!
//! ```
//! use specforge::core::templates::{FileState, TemplateType};
//! use std::str::FromStr;
//!
//! let scope = TemplateType::from_str("model_each").unwrap();
//! assert_eq!(scope, TemplateType::ModelEach);
//! assert_eq!(scope.to_string(), "model_each");
//!
//! assert_eq!(FileState::SkippedByName.as_str(), "skipped-by-name");
//! assert!(TemplateType::from_str("Model_Each").is_err());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;

use crate::core::error::Error;

/// Rendering cardinality of a template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateType {
    /// Rendered once, independent of any spec entities
    #[serde(rename = "support_once")]
    SupportOnce,
    /// Rendered once per specification document
    #[serde(rename = "api_once")]
    ApiOnce,
    /// Rendered once per API group (tag)
    #[serde(rename = "api_each")]
    ApiEach,
    /// Rendered once per operation
    #[serde(rename = "operation_each")]
    OperationEach,
    /// Rendered once per model schema
    #[serde(rename = "model_each")]
    ModelEach,
    /// Rendered once per enumeration schema
    #[serde(rename = "enum_each")]
    EnumEach,
}

impl TemplateType {
    /// All template types in declaration order
    pub fn all() -> &'static [TemplateType] {
        &[
            Self::SupportOnce,
            Self::ApiOnce,
            Self::ApiEach,
            Self::OperationEach,
            Self::ModelEach,
            Self::EnumEach,
        ]
    }

    /// Returns the manifest literal for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupportOnce => "support_once",
            Self::ApiOnce => "api_once",
            Self::ApiEach => "api_each",
            Self::OperationEach => "operation_each",
            Self::ModelEach => "model_each",
            Self::EnumEach => "enum_each",
        }
    }

    /// Whether files of this type are rendered once per entity
    pub fn is_each(&self) -> bool {
        matches!(
            self,
            Self::ApiEach | Self::OperationEach | Self::ModelEach | Self::EnumEach
        )
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownTemplateType(s.to_string()))
    }
}

/// Outcome of a single file evaluation during a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileState {
    /// Would have been written, the write was suppressed by `dry_run`
    #[serde(rename = "dry-run")]
    DryRun,
    /// Excluded because the target name matched `ignore_files`
    #[serde(rename = "skipped-by-name")]
    SkippedByName,
    /// Excluded because the file type was not in `types`
    #[serde(rename = "skipped-by-scope")]
    SkippedByScope,
    /// Written to disk
    #[serde(rename = "rendered")]
    Rendered,
}

impl FileState {
    pub fn all() -> &'static [FileState] {
        &[
            Self::DryRun,
            Self::SkippedByName,
            Self::SkippedByScope,
            Self::Rendered,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DryRun => "dry-run",
            Self::SkippedByName => "skipped-by-name",
            Self::SkippedByScope => "skipped-by-scope",
            Self::Rendered => "rendered",
        }
    }

    /// Whether the file was excluded before the write decision
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedByName | Self::SkippedByScope)
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::UnknownFileState(s.to_string()))
    }
}

/// Parameters of a render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOpts {
    /// Compute every decision but write nothing
    pub dry_run: bool,
    /// Allowlist of template types; empty means every type
    pub types: HashSet<TemplateType>,
    /// Target file names (or output-relative paths) that must not be rendered
    pub ignore_files: HashSet<String>,
}

impl RenderOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_types<I: IntoIterator<Item = TemplateType>>(mut self, types: I) -> Self {
        self.types.extend(types);
        self
    }

    pub fn ignore_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_files.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether a file of the given type passes the scope filter
    pub fn allows_type(&self, template_type: TemplateType) -> bool {
        self.types.is_empty() || self.types.contains(&template_type)
    }

    /// Whether a target matches the name blocklist, by file name or by
    /// `/`-separated path relative to the output directory
    pub fn ignores(&self, file_name: &str, relative_path: &str) -> bool {
        self.ignore_files.contains(file_name) || self.ignore_files.contains(relative_path)
    }
}

/// Result record for one file evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedFile {
    /// Resolved output path, or the path that would have been used
    pub file: PathBuf,
    /// Source template that produced the output
    pub template_file: String,
    pub state: FileState,
}

/// A named template set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateConfig {
    /// Unique identifier, conventionally `<spec-type>-<generator>-<artifact-kind>`
    pub id: String,

    /// Human-readable description, only used to list available sets
    #[serde(default)]
    pub description: String,

    /// Files rendered by this set, in output order
    pub files: Vec<TemplateFile>,
}

/// One template unit within a [`TemplateConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateFile {
    #[serde(default)]
    pub description: String,

    /// Path to the template, relative to the template set directory
    pub source_template: String,

    /// Fragments available to the source template via `include`/`import`
    #[serde(default, deserialize_with = "deserialize_paths")]
    pub snippets: Vec<String>,

    /// Destination directory expression, relative to the output directory
    #[serde(default)]
    pub target_directory: String,

    /// File name expression
    pub target_file_name: String,

    #[serde(rename = "type")]
    pub template_type: TemplateType,
}

impl TemplateConfig {
    /// Files of the given type, in manifest order
    pub fn files_of_type(&self, template_type: TemplateType) -> impl Iterator<Item = &TemplateFile> {
        self.files
            .iter()
            .filter(move |f| f.template_type == template_type)
    }
}

/// Accepts either a single path or a list of paths
fn deserialize_paths<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => seq
            .into_iter()
            .map(|item| match item {
                SerdeValue::String(s) => Ok(s),
                _ => Err(serde::de::Error::custom(
                    "Expected string or array of strings",
                )),
            })
            .collect(),
        SerdeValue::Unit | SerdeValue::Option(None) => Ok(Vec::new()),
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_type_literals() {
        let literals = [
            "support_once",
            "api_once",
            "api_each",
            "operation_each",
            "model_each",
            "enum_each",
        ];
        for (literal, template_type) in literals.iter().zip(TemplateType::all()) {
            assert_eq!(template_type.as_str(), *literal);
            assert_eq!(literal.parse::<TemplateType>().unwrap(), *template_type);
            assert_eq!(
                serde_json::to_string(template_type).unwrap(),
                format!("\"{literal}\"")
            );
        }
    }

    #[test]
    fn test_template_type_rejects_synonyms() {
        for bad in ["SupportOnce", "MODEL_EACH", "model-each", "model", ""] {
            let err = bad.parse::<TemplateType>().unwrap_err();
            assert!(matches!(err, Error::UnknownTemplateType(_)));
        }
        assert!(serde_json::from_str::<TemplateType>("\"models_each\"").is_err());
    }

    #[test]
    fn test_template_type_is_each() {
        assert!(!TemplateType::SupportOnce.is_each());
        assert!(!TemplateType::ApiOnce.is_each());
        assert!(TemplateType::ApiEach.is_each());
        assert!(TemplateType::EnumEach.is_each());
    }

    #[test]
    fn test_file_state_literals() {
        let literals = ["dry-run", "skipped-by-name", "skipped-by-scope", "rendered"];
        for (literal, state) in literals.iter().zip(FileState::all()) {
            assert_eq!(state.to_string(), *literal);
            assert_eq!(literal.parse::<FileState>().unwrap(), *state);
            let json = serde_json::to_string(state).unwrap();
            assert_eq!(serde_json::from_str::<FileState>(&json).unwrap(), *state);
        }
        assert!(matches!(
            "skipped".parse::<FileState>(),
            Err(Error::UnknownFileState(_))
        ));
        assert!(serde_json::from_str::<FileState>("\"Rendered\"").is_err());
    }

    #[test]
    fn test_render_opts_filters() {
        let opts = RenderOpts::new();
        assert!(opts.allows_type(TemplateType::ModelEach));
        assert!(!opts.ignores("main.go", "cmd/main.go"));

        let opts = RenderOpts::new()
            .with_types([TemplateType::SupportOnce])
            .ignore_files(["README.md", "cmd/main.go"]);
        assert!(opts.allows_type(TemplateType::SupportOnce));
        assert!(!opts.allows_type(TemplateType::ModelEach));
        assert!(opts.ignores("README.md", "docs/README.md"));
        assert!(opts.ignores("main.go", "cmd/main.go"));
        assert!(!opts.ignores("main.go", "main.go"));
    }

    #[test]
    fn test_rendered_file_serialization() {
        let rendered = RenderedFile {
            file: PathBuf::from("out/pet.go"),
            template_file: "model.go.tera".to_string(),
            state: FileState::SkippedByScope,
        };
        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!(json["file"], "out/pet.go");
        assert_eq!(json["templateFile"], "model.go.tera");
        assert_eq!(json["state"], "skipped-by-scope");
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
id: openapi-go-client
description: Go client
files:
  - description: models
    sourceTemplate: model.go.tera
    snippets: snippets/doc.tera
    targetDirectory: models
    targetFileName: "{{ name }}.go"
    type: model_each
  - sourceTemplate: go.mod.tera
    targetFileName: go.mod
    type: support_once
"#;
        let config: TemplateConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.id, "openapi-go-client");
        assert_eq!(config.files.len(), 2);
        assert_eq!(config.files[0].snippets, vec!["snippets/doc.tera"]);
        assert_eq!(config.files[0].template_type, TemplateType::ModelEach);
        assert!(config.files[1].snippets.is_empty());
        assert!(config.files[1].target_directory.is_empty());
        assert_eq!(config.files_of_type(TemplateType::SupportOnce).count(), 1);
    }

    #[test]
    fn test_config_rejects_unknown_type() {
        let yaml = r#"
id: openapi-go-client
files:
  - sourceTemplate: model.go.tera
    targetFileName: "{{ name }}.go"
    type: schema_each
"#;
        let err = serde_yaml::from_str::<TemplateConfig>(yaml).unwrap_err();
        assert!(err.to_string().contains("schema_each"));
    }

    #[test]
    fn test_config_rejects_snippet_maps() {
        let yaml = r#"
id: openapi-go-client
files:
  - sourceTemplate: model.go.tera
    snippets:
      doc: snippets/doc.tera
    targetFileName: "{{ name }}.go"
    type: model_each
"#;
        assert!(serde_yaml::from_str::<TemplateConfig>(yaml).is_err());
    }
}
