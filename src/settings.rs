use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::Theme;

/// Construction-time options for the app shell.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub default_theme: Theme,
    pub storage_key: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::Dark,
            storage_key: "mclite-ui-theme".to_string(),
        }
    }
}

impl ShellConfig {
    pub fn settings_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(format!("{}.json", self.storage_key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
}

impl Settings {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Missing or unreadable files yield `default_theme`.
    pub async fn load(path: PathBuf, default_theme: Theme) -> Self {
        match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt settings at {}: {}", path.display(), e);
                Self::new(default_theme)
            }),
            Err(_) => Self::new(default_theme),
        }
    }

    pub async fn save(self, path: PathBuf) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self)?;
        fs::write(path, json).await
    }
}
