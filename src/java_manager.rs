use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::LaunchError;

const COMMON_PATHS: &[&str] = &["/usr/bin/java", "/usr/local/bin/java", "/opt/java/bin/java"];

#[derive(Debug, Clone, Default)]
pub struct JavaManager {
    java_home: Option<PathBuf>,
}

impl JavaManager {
    pub fn new() -> Self {
        Self {
            java_home: env::var_os("JAVA_HOME").map(PathBuf::from),
        }
    }

    /// Looks in `JAVA_HOME`, then `PATH`, then a few well-known locations.
    pub fn find_java(&self, required_version: Option<u32>) -> Result<PathBuf> {
        if let Some(version) = required_version {
            log::info!("Version requires Java {}", version);
        }

        if let Some(home) = &self.java_home {
            let java_bin = home.join("bin").join(java_binary_name());
            if java_bin.exists() {
                return Ok(java_bin);
            }
        }

        if let Ok(path) = which::which("java") {
            return Ok(path);
        }

        COMMON_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf)
            .ok_or_else(|| LaunchError::JavaNotFound.into())
    }
}

fn java_binary_name() -> &'static str {
    if cfg!(windows) { "java.exe" } else { "java" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_home_takes_precedence() {
        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(java_binary_name()), b"").unwrap();

        let manager = JavaManager {
            java_home: Some(home.path().to_path_buf()),
        };
        assert_eq!(manager.find_java(Some(17)).unwrap(), bin.join(java_binary_name()));
    }
}
