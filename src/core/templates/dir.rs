//! Template root and output directory resolution

use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::core::error::{Error, Result};

/// Environment variable naming the template root
pub const TEMPLATE_DIR_ENV: &str = "SPECFORGE_TEMPLATE_DIR";

/// Environment variable naming the default output directory
pub const OUTPUT_DIR_ENV: &str = "SPECFORGE_OUTPUT_DIR";

/// Trait for reading directory configuration, allowing dependency injection for testing
pub trait TemplateConfigReader {
    fn get_template_dir(&self) -> Option<String>;
    fn get_output_dir(&self) -> Option<String>;
}

/// Production implementation that reads from environment variables
pub struct EnvTemplateConfigReader;

impl TemplateConfigReader for EnvTemplateConfigReader {
    fn get_template_dir(&self) -> Option<String> {
        std::env::var(TEMPLATE_DIR_ENV).ok()
    }

    fn get_output_dir(&self) -> Option<String> {
        std::env::var(OUTPUT_DIR_ENV).ok()
    }
}

/// Mock implementation for testing with controlled values
#[cfg(test)]
#[derive(Default)]
pub struct MockTemplateConfigReader {
    template_dir: Option<String>,
    output_dir: Option<String>,
}

#[cfg(test)]
impl MockTemplateConfigReader {
    pub fn new(template_dir: Option<&Path>, output_dir: Option<&Path>) -> Self {
        Self {
            template_dir: template_dir.map(|p| p.display().to_string()),
            output_dir: output_dir.map(|p| p.display().to_string()),
        }
    }
}

#[cfg(test)]
impl TemplateConfigReader for MockTemplateConfigReader {
    fn get_template_dir(&self) -> Option<String> {
        self.template_dir.clone()
    }

    fn get_output_dir(&self) -> Option<String> {
        self.output_dir.clone()
    }
}

/// Resolve the template root directory.
///
/// Resolution order:
/// 1. `custom_dir` (CLI `--template-dir` flag)
/// 2. `SPECFORGE_TEMPLATE_DIR` environment variable
/// 3. `./templates`, if it exists
/// 4. `<config_dir>/specforge/templates`, if it exists
pub fn resolve_template_root(custom_dir: Option<&Path>) -> Result<PathBuf> {
    let working_dir = current_dir()?;
    resolve_template_root_with_config(custom_dir, &EnvTemplateConfigReader, &working_dir)
}

/// Resolve the template root with a custom config reader (for testing)
pub fn resolve_template_root_with_config(
    custom_dir: Option<&Path>,
    config_reader: &dyn TemplateConfigReader,
    working_dir: &Path,
) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        debug!("Using custom template directory: {}", dir.display());
        return existing_dir(absolute(dir, working_dir));
    }

    if let Some(dir) = config_reader.get_template_dir() {
        debug!("Using {TEMPLATE_DIR_ENV}: {dir}");
        return existing_dir(absolute(Path::new(&dir), working_dir));
    }

    let mut locations = vec![working_dir.join("templates")];
    if let Some(config_dir) = dirs::config_dir() {
        locations.push(config_dir.join("specforge").join("templates"));
    }
    debug!("Searching template locations: {:?}", locations);

    locations
        .into_iter()
        .find(|location| location.is_dir())
        .ok_or_else(|| {
            error!("Could not find a template directory in any standard location");
            Error::config(format!(
                "Could not find a template directory; pass --template-dir or set {TEMPLATE_DIR_ENV}"
            ))
        })
}

/// Resolve the directory rendered files are written under.
///
/// Resolution order:
/// 1. `custom_output_dir` (CLI `--output-dir` flag)
/// 2. `SPECFORGE_OUTPUT_DIR` environment variable
/// 3. The current directory
///
/// The directory does not need to exist yet.
pub fn resolve_output_dir(custom_output_dir: Option<&Path>) -> Result<PathBuf> {
    let working_dir = current_dir()?;
    Ok(resolve_output_dir_with_config(
        custom_output_dir,
        &EnvTemplateConfigReader,
        &working_dir,
    ))
}

/// Resolve the output directory with a custom config reader (for testing)
pub fn resolve_output_dir_with_config(
    custom_output_dir: Option<&Path>,
    config_reader: &dyn TemplateConfigReader,
    working_dir: &Path,
) -> PathBuf {
    let output_dir = if let Some(dir) = custom_output_dir {
        debug!("Using custom output directory: {}", dir.display());
        absolute(dir, working_dir)
    } else if let Some(dir) = config_reader.get_output_dir() {
        debug!("Using {OUTPUT_DIR_ENV}: {dir}");
        absolute(Path::new(&dir), working_dir)
    } else {
        working_dir.to_path_buf()
    };

    debug!("Resolved output path: {}", output_dir.display());
    output_dir
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map_err(|e| Error::config(format!("Failed to get current directory: {e}")))
}

fn absolute(path: &Path, working_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

fn existing_dir(path: PathBuf) -> Result<PathBuf> {
    if path.is_dir() {
        Ok(path)
    } else {
        error!("Template directory not found: {}", path.display());
        Err(Error::config(format!(
            "Template directory not found: {}",
            path.display()
        )))
    }
}
