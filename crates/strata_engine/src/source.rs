//! Discovery and reading of project sources.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use strata_config::ResolvedConfig;
use strata_extract::{classify, is_excluded};

use crate::error::SourceError;

/// Enumerates and reads the sources a full scan covers.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Lists candidate source identifiers for `config`.
    ///
    /// The engine classifies and filters the result again, so a provider may
    /// over-report.
    async fn discover(&self, config: &ResolvedConfig) -> Result<Vec<String>, SourceError>;

    /// Reads the text of one source.
    async fn read(&self, id: &str) -> Result<String, SourceError>;
}

/// Walks the configured scan directories below a project root.
///
/// Identifiers are paths relative to the root with `/` separators. Glob
/// `include` patterns are left to hosts with their own discovery; this
/// provider applies only the directory roots, exclusions, and extensions.
#[derive(Debug, Clone)]
pub struct FsSources {
    root: PathBuf,
}

impl FsSources {
    /// Creates a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn id_of(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[async_trait]
impl SourceProvider for FsSources {
    async fn discover(&self, config: &ResolvedConfig) -> Result<Vec<String>, SourceError> {
        let mut found = Vec::new();
        let mut pending: Vec<PathBuf> = config.scan.dirs.iter().map(|dir| self.root.join(dir)).collect();
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(dir = %dir.display(), "scan directory missing");
                    continue;
                }
                Err(err) => return Err(SourceError::io(dir.display().to_string(), err)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|err| SourceError::io(dir.display().to_string(), err))?
            {
                let path = entry.path();
                let id = self.id_of(&path);
                if is_excluded(&id, &config.scan) {
                    continue;
                }
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|err| SourceError::io(id.clone(), err))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if classify(&id, &config.scan).is_some() {
                    found.push(id);
                }
            }
        }
        found.sort();
        found.dedup();
        Ok(found)
    }

    async fn read(&self, id: &str) -> Result<String, SourceError> {
        tokio::fs::read_to_string(self.root.join(id))
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => SourceError::NotFound(id.to_string()),
                _ => SourceError::io(id, err),
            })
    }
}
