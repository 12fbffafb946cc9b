//! Template set discovery.
//!
//! A template root either is a template set itself (it holds a manifest) or
//! contains one subdirectory per template set. Subdirectories without a
//! manifest are ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::core::error::{Error, Result};

use super::TemplateConfig;
use super::manifest::{self, find_manifest};

/// A loaded template set and the directory its paths are relative to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub root: PathBuf,
    pub config: TemplateConfig,
}

/// Access to template sets by id
pub trait TemplateRepository {
    /// All template sets, sorted by id
    fn list(&self) -> Vec<&TemplateSet>;

    /// Look up a template set by id
    fn get(&self, id: &str) -> Result<&TemplateSet>;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_ok()
    }
}

/// Template sets discovered in a directory tree
#[derive(Debug, Default)]
pub struct FilesystemTemplateRepository {
    root: PathBuf,
    sets: BTreeMap<String, TemplateSet>,
}

impl FilesystemTemplateRepository {
    /// Scan `root` and load every manifest found.
    ///
    /// # Errors
    ///
    /// Fails if `root` can't be read, a manifest is invalid, or two sets
    /// declare the same id.
    pub async fn scan(root: &Path) -> Result<Self> {
        let mut repository = Self {
            root: root.to_path_buf(),
            sets: BTreeMap::new(),
        };

        if find_manifest(root).is_some() {
            repository.insert(root.to_path_buf()).await?;
        } else {
            let mut set_dirs = Vec::new();
            let mut entries = fs::read_dir(root).await.map_err(|e| {
                Error::config(format!(
                    "Failed to read template directory {}: {e}",
                    root.display()
                ))
            })?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if !entry.file_type().await?.is_dir() {
                    continue;
                }
                if find_manifest(&path).is_some() {
                    set_dirs.push(path);
                } else {
                    debug!("Skipping {} (no manifest)", path.display());
                }
            }
            // read_dir order is platform dependent
            set_dirs.sort();
            for dir in set_dirs {
                repository.insert(dir).await?;
            }
        }

        info!(
            root = %root.display(),
            count = repository.sets.len(),
            "Discovered template sets"
        );
        Ok(repository)
    }

    async fn insert(&mut self, dir: PathBuf) -> Result<()> {
        let config = manifest::load_from_dir(&dir).await?;
        if let Some(existing) = self.sets.get(&config.id) {
            return Err(Error::config(format!(
                "Duplicate template set id '{}' in {} and {}",
                config.id,
                existing.root.display(),
                dir.display()
            )));
        }
        debug!(id = %config.id, dir = %dir.display(), "Registered template set");
        self.sets
            .insert(config.id.clone(), TemplateSet { root: dir, config });
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateRepository for FilesystemTemplateRepository {
    fn list(&self) -> Vec<&TemplateSet> {
        self.sets.values().collect()
    }

    fn get(&self, id: &str) -> Result<&TemplateSet> {
        self.sets
            .get(id)
            .ok_or_else(|| Error::TemplateNotFound(id.to_string()))
    }
}
