//! Template sets and their rendering.
//!
//! A template set is described by a manifest ([`TemplateConfig`]), discovered
//! through a [`TemplateRepository`], compiled into a [`TemplateEngine`] and
//! rendered against a specification document by a [`Renderer`].

pub mod context;
pub mod dir;
pub mod engine;
pub mod manifest;
pub mod renderer;
pub mod repository;
pub mod types;

pub use context::{RenderContext, ScopeEntity};
pub use dir::{
    EnvTemplateConfigReader, OUTPUT_DIR_ENV, TEMPLATE_DIR_ENV, TemplateConfigReader,
    resolve_output_dir, resolve_template_root,
};
pub use engine::TemplateEngine;
pub use renderer::{FileSystemWriter, OutputWriter, RenderSummary, Renderer};
pub use repository::{FilesystemTemplateRepository, TemplateRepository, TemplateSet};
pub use types::*;
