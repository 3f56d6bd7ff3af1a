//! Where the engine's configuration comes from.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use strata_config::{load_config, ConfigError, ResolvedConfig};

/// Resolves the configuration an initialization builds its compiler from.
///
/// Consulted once per initialization, so a source that reads from disk picks
/// up edits on the next [`Engine::init`](crate::Engine::init).
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Produces the current resolved configuration.
    async fn resolve(&self) -> Result<ResolvedConfig, ConfigError>;
}

#[async_trait]
impl ConfigSource for ResolvedConfig {
    async fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        Ok(self.clone())
    }
}

/// Reads `strata.toml` from a project directory on every resolution.
#[derive(Debug, Clone)]
pub struct ConfigDir {
    dir: PathBuf,
}

impl ConfigDir {
    /// Creates a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ConfigSource for ConfigDir {
    async fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || load_config(&dir))
            .await
            .map_err(|err| ConfigError::Read {
                path: self.dir.clone(),
                source: io::Error::new(io::ErrorKind::Other, err),
            })?
    }
}
