//! Specification document loaders
//!
//! Loaders only fetch and decode content; interpretation is done by
//! [`OpenApiParser`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::core::error::{Error, Result};

use super::parser::OpenApiParser;
use super::types::SpecDocument;

/// Loads a specification document from a source string
#[async_trait]
pub trait SpecLoader: Send + Sync {
    async fn load(&self, source: &str) -> Result<SpecDocument>;
}

/// Serialization format of a fetched document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON first, then YAML
    Unknown,
}

impl DocumentFormat {
    pub fn from_path(path: &str) -> Self {
        match std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some("json") => Self::Json,
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Unknown,
        }
    }

    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.contains("json") {
            Self::Json
        } else if content_type.contains("yaml") {
            Self::Yaml
        } else {
            Self::Unknown
        }
    }

    pub fn decode(self, content: &str) -> Result<JsonValue> {
        let value = match self {
            Self::Json => serde_json::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Unknown => match serde_json::from_str(content) {
                Ok(value) => value,
                Err(_) => serde_yaml::from_str(content)?,
            },
        };
        Ok(value)
    }
}

/// Loads documents from local files
#[derive(Debug, Default)]
pub struct FileSpecLoader;

impl FileSpecLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpecLoader for FileSpecLoader {
    async fn load(&self, source: &str) -> Result<SpecDocument> {
        let content = fs::read_to_string(source).await.map_err(|e| {
            Error::spec(format!("Failed to read specification {source}: {e}"))
        })?;
        let value = DocumentFormat::from_path(source).decode(&content)?;
        OpenApiParser::new(value).parse()
    }
}

/// Loads documents from HTTP(S) URLs
#[derive(Debug)]
pub struct HttpSpecLoader {
    client: Client,
}

impl HttpSpecLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SpecLoader for HttpSpecLoader {
    async fn load(&self, source: &str) -> Result<SpecDocument> {
        if !is_remote(source) {
            return Err(Error::spec(format!(
                "HttpSpecLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        let response = self.client.get(source).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::spec(format!("HTTP {status} when fetching {source}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let content = response.text().await?;

        let format = match DocumentFormat::from_content_type(&content_type) {
            DocumentFormat::Unknown => DocumentFormat::from_path(response_path(source)),
            known => known,
        };
        let value = format.decode(&content)?;
        OpenApiParser::new(value).parse()
    }
}

/// Dispatches to the HTTP or file loader based on the source
pub struct CompositeSpecLoader {
    http: HttpSpecLoader,
    file: FileSpecLoader,
}

impl CompositeSpecLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpSpecLoader::new()?,
            file: FileSpecLoader::new(),
        })
    }
}

#[async_trait]
impl SpecLoader for CompositeSpecLoader {
    async fn load(&self, source: &str) -> Result<SpecDocument> {
        if is_remote(source) {
            debug!(source, "Loading specification over HTTP");
            self.http.load(source).await
        } else {
            debug!(source, "Loading specification from file");
            self.file.load(source).await
        }
    }
}

/// The path component of a URL, without query or fragment
fn response_path(source: &str) -> &str {
    let end = source.find(['?', '#']).unwrap_or(source.len());
    &source[..end]
}

fn is_remote(source: &str) -> bool {
    Url::parse(source)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

impl SpecDocument {
    /// Load a document from a local path or an HTTP(S) URL
    pub async fn from_file_or_url(source: &str) -> Result<Self> {
        CompositeSpecLoader::new()?.load(source).await
    }
}
