//! specforge CLI entrypoint
//! Parses command-line arguments and dispatches to the template renderer.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use specforge::core::{
    openapi::SpecDocument,
    templates::{
        FilesystemTemplateRepository, RenderOpts, RenderSummary, RenderedFile, Renderer,
        TemplateRepository, TemplateSet, TemplateType, resolve_output_dir, resolve_template_root,
    },
};
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Inspect available template sets
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },
    /// Render a template set against an API specification
    Render {
        /// Id of the template set to render
        #[arg(long)]
        template: String,
        /// Path or URL to the specification document (YAML or JSON)
        #[arg(long)]
        spec: String,
        /// Custom template directory
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// Output directory for rendered files
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Report what would be rendered without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Only render files of these types (repeatable)
        #[arg(long = "type", value_name = "TYPE", value_parser = parse_template_type)]
        types: Vec<TemplateType>,
        /// Skip files with this name or output-relative path (repeatable)
        #[arg(long = "ignore", value_name = "NAME")]
        ignore_files: Vec<String>,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum TemplateCommands {
    /// List template sets
    List {
        /// Custom template directory
        #[arg(long)]
        template_dir: Option<PathBuf>,
    },
    /// Show the files of a template set
    Info {
        /// Template set id
        id: String,
        /// Custom template directory
        #[arg(long)]
        template_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

fn parse_template_type(value: &str) -> Result<TemplateType, String> {
    value.parse::<TemplateType>().map_err(|_| {
        let expected: Vec<&str> = TemplateType::all().iter().map(|t| t.as_str()).collect();
        format!(
            "unknown template type '{value}' (expected one of: {})",
            expected.join(", ")
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Templates { action } => match action {
            TemplateCommands::List { template_dir } => list_templates(template_dir.as_deref()).await?,
            TemplateCommands::Info { id, template_dir } => {
                template_info(&id, template_dir.as_deref()).await?
            }
        },
        Commands::Render {
            template,
            spec,
            template_dir,
            output_dir,
            dry_run,
            types,
            ignore_files,
            format,
        } => {
            let opts = RenderOpts::new()
                .dry_run(dry_run)
                .with_types(types)
                .ignore_files(ignore_files);
            render(RenderParams {
                template: &template,
                spec: &spec,
                template_dir: template_dir.as_deref(),
                output_dir: output_dir.as_deref(),
                opts,
                format,
            })
            .await?
        }
    }
    Ok(())
}

async fn open_repository(template_dir: Option<&Path>) -> anyhow::Result<FilesystemTemplateRepository> {
    let root = resolve_template_root(template_dir).context("Failed to resolve template directory")?;
    FilesystemTemplateRepository::scan(&root)
        .await
        .with_context(|| format!("Failed to load template sets from {}", root.display()))
}

async fn list_templates(template_dir: Option<&Path>) -> anyhow::Result<()> {
    let repository = open_repository(template_dir).await?;
    let sets = repository.list();
    if sets.is_empty() {
        println!("No template sets found in {}", repository.root().display());
        return Ok(());
    }

    let width = sets.iter().map(|s| s.config.id.len()).max().unwrap_or_default();
    for set in sets {
        println!("{:<width$}  {}", set.config.id, set.config.description);
    }
    Ok(())
}

async fn template_info(id: &str, template_dir: Option<&Path>) -> anyhow::Result<()> {
    let repository = open_repository(template_dir).await?;
    let set = repository.get(id)?;
    print_template_set(set);
    Ok(())
}

fn print_template_set(set: &TemplateSet) {
    println!("{}", set.config.id);
    if !set.config.description.is_empty() {
        println!("  {}", set.config.description);
    }
    println!("  root: {}", set.root.display());
    println!("files:");
    for file in &set.config.files {
        let target = if file.target_directory.is_empty() {
            file.target_file_name.clone()
        } else {
            format!("{}/{}", file.target_directory, file.target_file_name)
        };
        println!("  - {} [{}] -> {}", file.source_template, file.template_type, target);
        if !file.description.is_empty() {
            println!("    {}", file.description);
        }
        if !file.snippets.is_empty() {
            println!("    snippets: {}", file.snippets.join(", "));
        }
    }
}

/// Parameters for a render command
struct RenderParams<'a> {
    template: &'a str,
    spec: &'a str,
    template_dir: Option<&'a Path>,
    output_dir: Option<&'a Path>,
    opts: RenderOpts,
    format: ReportFormat,
}

async fn render(params: RenderParams<'_>) -> anyhow::Result<()> {
    let repository = open_repository(params.template_dir).await?;
    let set = repository.get(params.template)?;
    let output_dir =
        resolve_output_dir(params.output_dir).context("Failed to resolve output directory")?;

    info!(
        template = %set.config.id,
        spec = %params.spec,
        output_dir = %output_dir.display(),
        dry_run = params.opts.dry_run,
        "Rendering template set"
    );

    let spec = SpecDocument::from_file_or_url(params.spec)
        .await
        .with_context(|| format!("Failed to load specification from {}", params.spec))?;
    let renderer = Renderer::load(&set.root, set.config.clone())
        .await
        .with_context(|| format!("Failed to compile template set '{}'", set.config.id))?;
    let files = renderer
        .render(&spec, &output_dir, &params.opts)
        .await
        .with_context(|| format!("Failed to render template set '{}'", set.config.id))?;

    let summary = RenderSummary::from_files(&files);
    match params.format {
        ReportFormat::Text => print_text_report(&files, &output_dir, &summary),
        ReportFormat::Json => {
            let report = json!({
                "template": set.config.id,
                "outputDir": output_dir,
                "files": files,
                "summary": summary,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        }
    }
    Ok(())
}

fn print_text_report(files: &[RenderedFile], output_dir: &Path, summary: &RenderSummary) {
    for file in files {
        let path = file.file.strip_prefix(output_dir).unwrap_or(&file.file);
        println!(
            "{:<16} {} ({})",
            file.state.as_str(),
            path.display(),
            file.template_file
        );
    }
    println!("{summary}");
}
