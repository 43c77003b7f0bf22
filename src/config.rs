// config.rs - Configuration and file system operations

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

pub const DEFAULT_DIR_NAME: &str = ".minecraft-lite";
pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub minecraft_dir: PathBuf,
    pub versions_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub libraries_dir: PathBuf,
    pub concurrency: usize,
}

impl LauncherConfig {
    /// Uses `dir` as the root when given, `$HOME/.minecraft-lite` otherwise.
    pub fn new(dir: Option<PathBuf>, concurrency: usize) -> Result<Self> {
        let minecraft_dir = match dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .context("Could not find home directory")?
                .join(DEFAULT_DIR_NAME),
        };
        Ok(Self::with_root(minecraft_dir, concurrency))
    }

    pub fn with_root(minecraft_dir: PathBuf, concurrency: usize) -> Self {
        Self {
            versions_dir: minecraft_dir.join("versions"),
            assets_dir: minecraft_dir.join("assets"),
            libraries_dir: minecraft_dir.join("libraries"),
            minecraft_dir,
            concurrency: if concurrency == 0 { DEFAULT_CONCURRENCY } else { concurrency },
        }
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.minecraft_dir).await?;
        fs::create_dir_all(&self.versions_dir).await?;
        fs::create_dir_all(&self.assets_dir).await?;
        fs::create_dir_all(&self.libraries_dir).await?;
        Ok(())
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions_dir.join(version)
    }

    pub fn version_json_path(&self, version: &str) -> PathBuf {
        self.version_dir(version).join(format!("{}.json", version))
    }

    pub fn client_jar_path(&self, version: &str) -> PathBuf {
        self.version_dir(version).join(format!("{}.jar", version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_derived_from_root() {
        let config = LauncherConfig::with_root(PathBuf::from("/tmp/mc"), 4);
        assert_eq!(config.libraries_dir, PathBuf::from("/tmp/mc/libraries"));
        assert_eq!(config.client_jar_path("1.20.1"), PathBuf::from("/tmp/mc/versions/1.20.1/1.20.1.jar"));
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn zero_concurrency_falls_back_to_default() {
        let config = LauncherConfig::with_root(PathBuf::from("/tmp/mc"), 0);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[tokio::test]
    async fn ensure_directories_creates_layout() {
        let root = tempfile::tempdir().unwrap();
        let config = LauncherConfig::with_root(root.path().join("mc"), 1);
        config.ensure_directories().await.unwrap();
        assert!(config.versions_dir.is_dir());
        assert!(config.assets_dir.is_dir());
        assert!(config.libraries_dir.is_dir());
    }
}
