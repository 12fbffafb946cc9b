//! Render code-generation template sets against OpenAPI and Swagger
//! documents.
//!
//! ```no_run
//! use std::path::Path;
//! use specforge::core::openapi::SpecDocument;
//! use specforge::core::templates::{
//!     FilesystemTemplateRepository, RenderOpts, Renderer, TemplateRepository,
//! };
//!
//! # async fn run() -> specforge::core::error::Result<()> {
//! let repository = FilesystemTemplateRepository::scan(Path::new("templates")).await?;
//! let set = repository.get("openapi-go-client")?;
//! let renderer = Renderer::load(&set.root, set.config.clone()).await?;
//!
//! let spec = SpecDocument::from_file_or_url("petstore.yaml").await?;
//! let files = renderer
//!     .render(&spec, Path::new("out"), &RenderOpts::new().dry_run(true))
//!     .await?;
//! for file in files {
//!     println!("{} {}", file.state, file.file.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
