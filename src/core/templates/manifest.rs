//! Manifest file format for template sets.
//!
//! A template set directory holds exactly one manifest describing the set as a
//! [`TemplateConfig`]. YAML, TOML and JSON are accepted; when several exist the
//! first of [`MANIFEST_FILE_NAMES`] wins.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs;
use tracing::debug;

use crate::core::error::{Error, Result};

use super::TemplateConfig;

/// Recognized manifest file names, in lookup order
pub const MANIFEST_FILE_NAMES: &[&str] = &[
    "manifest.yml",
    "manifest.yaml",
    "manifest.toml",
    "manifest.json",
];

/// Returns the manifest path inside `dir`, if one exists
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    MANIFEST_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load and validate the manifest of a template set directory.
///
/// # Errors
///
/// Returns an error if no manifest exists, it can't be read, it fails to
/// parse, or it fails validation.
pub async fn load_from_dir(template_dir: &Path) -> Result<TemplateConfig> {
    let manifest_path = find_manifest(template_dir).ok_or_else(|| {
        Error::invalid_manifest(
            template_dir.display().to_string(),
            format!("no manifest found (expected one of {})", MANIFEST_FILE_NAMES.join(", ")),
        )
    })?;

    debug!(
        manifest_path = %manifest_path.display(),
        "Reading template manifest"
    );
    let content = fs::read_to_string(&manifest_path).await?;
    let config = parse_manifest(&manifest_path, &content)?;
    validate(&config).map_err(|message| {
        Error::invalid_manifest(manifest_path.display().to_string(), message)
    })?;

    debug!(
        id = %config.id,
        files = config.files.len(),
        "Loaded template manifest"
    );
    Ok(config)
}

/// Parse manifest content, picking the format from the file extension
pub fn parse_manifest(path: &Path, content: &str) -> Result<TemplateConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let config: TemplateConfig = match extension {
        "toml" => toml::from_str(content)?,
        "json" => serde_json::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Check the structural rules the serde model can't express
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid id pattern"));

pub fn validate(config: &TemplateConfig) -> std::result::Result<(), String> {

    if config.id.is_empty() {
        return Err("id must not be empty".to_string());
    }
    if !ID_PATTERN.is_match(&config.id) {
        return Err(format!(
            "id '{}' may only contain letters, digits, '.', '_' and '-'",
            config.id
        ));
    }
    if config.files.is_empty() {
        return Err(format!("template set '{}' declares no files", config.id));
    }

    let mut seen = HashSet::new();
    for (index, file) in config.files.iter().enumerate() {
        if file.source_template.trim().is_empty() {
            return Err(format!("files[{index}]: sourceTemplate must not be empty"));
        }
        if file.target_file_name.trim().is_empty() {
            return Err(format!("files[{index}]: targetFileName must not be empty"));
        }
        if let Some(snippet) = file.snippets.iter().find(|s| s.trim().is_empty()) {
            return Err(format!("files[{index}]: empty snippet path '{snippet}'"));
        }
        let mut sources = std::iter::once(&file.source_template).chain(&file.snippets);
        if let Some(path) = sources.find(|p| !is_inside_set(p)) {
            return Err(format!(
                "files[{index}]: template path '{path}' must be relative to the template set directory"
            ));
        }
        let key = (
            &file.source_template,
            &file.target_directory,
            &file.target_file_name,
        );
        if !seen.insert(key) {
            return Err(format!(
                "files[{index}]: duplicate entry for template '{}'",
                file.source_template
            ));
        }
    }
    Ok(())
}

/// Relative and free of `..`
fn is_inside_set(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
