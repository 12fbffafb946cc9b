//! Render driver for template sets.
//!
//! For every file of the set and every entity its type expands to, the
//! renderer resolves the target path, applies the name and scope filters and
//! then either records a dry run or writes the rendered body once.

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::core::error::{Error, Result};
use crate::core::openapi::SpecDocument;

use super::context::{RenderContext, ScopeEntity};
use super::engine::TemplateEngine;
use super::{FileState, RenderOpts, RenderedFile, TemplateConfig, TemplateFile};

/// Destination of rendered files
#[async_trait]
pub trait OutputWriter: Send + Sync {
    /// Write `content` to `path`, creating parent directories as needed
    async fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// Writes rendered files to the local filesystem
#[derive(Debug, Default)]
pub struct FileSystemWriter;

impl FileSystemWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputWriter for FileSystemWriter {
    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::output(parent, e))?;
        }
        fs::write(path, content)
            .await
            .map_err(|e| Error::output(path, e))
    }
}

/// Per-state counts of a render pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    pub rendered: usize,
    pub dry_run: usize,
    pub skipped_by_name: usize,
    pub skipped_by_scope: usize,
}

impl RenderSummary {
    pub fn from_files(files: &[RenderedFile]) -> Self {
        files.iter().fold(Self::default(), |mut summary, file| {
            match file.state {
                FileState::Rendered => summary.rendered += 1,
                FileState::DryRun => summary.dry_run += 1,
                FileState::SkippedByName => summary.skipped_by_name += 1,
                FileState::SkippedByScope => summary.skipped_by_scope += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.rendered + self.dry_run + self.skipped_by_name + self.skipped_by_scope
    }
}

impl fmt::Display for RenderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rendered, {} dry-run, {} skipped-by-name, {} skipped-by-scope",
            self.rendered, self.dry_run, self.skipped_by_name, self.skipped_by_scope
        )
    }
}

/// A compiled template set ready to render
pub struct Renderer {
    config: TemplateConfig,
    engine: TemplateEngine,
    writer: Arc<dyn OutputWriter>,
}

impl Renderer {
    /// Compile the templates of `config`, resolved relative to `template_dir`
    pub async fn load(template_dir: &Path, config: TemplateConfig) -> Result<Self> {
        let engine = TemplateEngine::load(template_dir, &config).await?;
        debug!(
            id = %config.id,
            templates = ?engine.template_names(),
            "Compiled template set"
        );
        Ok(Self {
            config,
            engine,
            writer: Arc::new(FileSystemWriter::new()),
        })
    }

    /// Replace the filesystem writer
    pub fn with_writer(mut self, writer: Arc<dyn OutputWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Run one render pass.
    ///
    /// Results are ordered by manifest file, then by entity in document
    /// order. Skipped files are reported once per entity as well.
    pub async fn render(
        &self,
        spec: &SpecDocument,
        output_dir: &Path,
        opts: &RenderOpts,
    ) -> Result<Vec<RenderedFile>> {
        let context = RenderContext::new(spec, &self.config)?;
        let mut results = Vec::new();
        let mut targets: HashMap<PathBuf, String> = HashMap::new();

        for (index, file) in self.config.files.iter().enumerate() {
            for entity in ScopeEntity::expand(file.template_type, spec) {
                let ctx = context.for_entity(&self.config, file, &entity)?;
                let (directory, file_name) = self.engine.render_target(index, &ctx)?;
                let target = TargetPath::resolve(&directory, &file_name)
                    .map_err(|message| Error::template(format!("{}: {message}", file.source_template)))?;
                let path = output_dir.join(&target.relative);

                let state = if opts.ignores(&target.file_name, &target.key) {
                    FileState::SkippedByName
                } else if !opts.allows_type(file.template_type) {
                    FileState::SkippedByScope
                } else {
                    let body = self.engine.render_body(&file.source_template, &ctx)?;
                    if let Some(previous) = targets.insert(path.clone(), file.source_template.clone()) {
                        warn!(
                            path = %path.display(),
                            first = %previous,
                            second = %file.source_template,
                            "Multiple renders resolve to the same target path, the last one wins"
                        );
                    }
                    self.emit(file, &path, &body, opts).await?
                };

                debug!(
                    template = %file.source_template,
                    entity = entity.name(&self.config),
                    path = %path.display(),
                    state = %state,
                    "Evaluated template file"
                );
                results.push(RenderedFile {
                    file: path,
                    template_file: file.source_template.clone(),
                    state,
                });
            }
        }

        info!(
            id = %self.config.id,
            output_dir = %output_dir.display(),
            summary = %RenderSummary::from_files(&results),
            "Render pass complete"
        );
        Ok(results)
    }

    async fn emit(
        &self,
        file: &TemplateFile,
        path: &Path,
        body: &str,
        opts: &RenderOpts,
    ) -> Result<FileState> {
        if opts.dry_run {
            return Ok(FileState::DryRun);
        }
        self.writer.write(path, body).await?;
        debug!(
            template = %file.source_template,
            path = %path.display(),
            bytes = body.len(),
            "Wrote file"
        );
        Ok(FileState::Rendered)
    }
}

/// Validated target location, relative to the output directory
#[derive(Debug, PartialEq, Eq)]
struct TargetPath {
    relative: PathBuf,
    /// Final path component
    file_name: String,
    /// `/`-joined relative path
    key: String,
}

impl TargetPath {
    fn resolve(directory: &str, file_name: &str) -> std::result::Result<Self, String> {
        if file_name.is_empty() {
            return Err("target file name rendered empty".to_string());
        }

        let mut parts = Vec::new();
        for raw in [directory, file_name] {
            for component in Path::new(raw).components() {
                match component {
                    Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                    Component::CurDir => {}
                    Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                        return Err(format!(
                            "target path '{}' is outside the output directory",
                            Path::new(directory).join(file_name).display()
                        ));
                    }
                }
            }
        }

        let Some(last) = parts.last().cloned() else {
            return Err(format!("target file name '{file_name}' names no file"));
        };
        Ok(Self {
            relative: parts.iter().collect(),
            file_name: last,
            key: parts.join("/"),
        })
    }
}
