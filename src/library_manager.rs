use anyhow::Result;
use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::launcher::DownloadTask;
use crate::models::{Library, VersionJson};
use crate::utils::is_library_allowed;

#[derive(Debug, Clone)]
pub struct LibraryManager {
    libraries_dir: PathBuf,
}

impl LibraryManager {
    pub fn new(libraries_dir: PathBuf) -> Self {
        Self { libraries_dir }
    }

    /// Libraries allowed on `os_name` that carry a downloadable artifact,
    /// deduplicated by `group:artifact`.
    fn allowed_libraries<'a>(&self, version_json: &'a VersionJson, os_name: &str) -> Vec<&'a Library> {
        let mut seen_artifacts: HashSet<String> = HashSet::new();
        version_json
            .libraries
            .iter()
            .filter(|lib| is_library_allowed(lib, os_name) && lib.artifact().is_some())
            .filter(|lib| {
                let parts: Vec<&str> = lib.name.split(':').collect();
                // natives carry a classifier as 4th part and must not shadow the main jar
                let key = parts.iter().take(if parts.len() > 3 { 4 } else { 2 }).copied().collect::<Vec<_>>().join(":");
                seen_artifacts.insert(key)
            })
            .collect()
    }

    pub fn download_tasks(&self, version_json: &VersionJson, os_name: &str) -> Vec<DownloadTask> {
        self.allowed_libraries(version_json, os_name)
            .into_iter()
            .filter_map(|lib| lib.artifact())
            .map(|artifact| DownloadTask {
                url: artifact.url.clone(),
                path: self.libraries_dir.join(&artifact.path),
            })
            .collect()
    }

    /// Library jars that exist on disk, followed by the client jar.
    pub fn build_classpath(&self, version_json: &VersionJson, os_name: &str, client_jar: &Path) -> Result<OsString> {
        let mut classpath: Vec<PathBuf> = self
            .allowed_libraries(version_json, os_name)
            .into_iter()
            .filter_map(|lib| lib.artifact())
            .map(|artifact| self.libraries_dir.join(&artifact.path))
            .filter(|path| path.exists())
            .collect();
        classpath.push(client_jar.to_path_buf());

        Ok(env::join_paths(classpath)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_json() -> VersionJson {
        serde_json::from_str(
            r#"{"id": "1.20.1", "libraries": [
                {"name": "com.mojang:brigadier:1.1.8",
                 "downloads": {"artifact": {"url": "https://l/brigadier.jar", "path": "com/mojang/brigadier.jar"}}},
                {"name": "org.lwjgl:lwjgl:3.3.1",
                 "downloads": {"artifact": {"url": "https://l/lwjgl.jar", "path": "org/lwjgl/lwjgl.jar"}}},
                {"name": "org.lwjgl:lwjgl:3.3.1:natives-linux",
                 "downloads": {"artifact": {"url": "https://l/lwjgl-natives.jar", "path": "org/lwjgl/lwjgl-natives-linux.jar"}},
                 "rules": [{"action": "allow", "os": {"name": "linux"}}]},
                {"name": "org.lwjgl:lwjgl:3.3.1:natives-windows",
                 "downloads": {"artifact": {"url": "https://l/lwjgl-win.jar", "path": "org/lwjgl/lwjgl-natives-windows.jar"}},
                 "rules": [{"action": "allow", "os": {"name": "windows"}}]},
                {"name": "org.lwjgl:lwjgl:3.2.2",
                 "downloads": {"artifact": {"url": "https://l/old.jar", "path": "org/lwjgl/old.jar"}}},
                {"name": "no.downloads:here:1.0"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn tasks_follow_os_rules_and_skip_duplicates() {
        let manager = LibraryManager::new(PathBuf::from("/mc/libraries"));
        let urls: Vec<String> = manager
            .download_tasks(&version_json(), "linux")
            .into_iter()
            .map(|t| t.url)
            .collect();
        assert_eq!(
            urls,
            vec!["https://l/brigadier.jar", "https://l/lwjgl.jar", "https://l/lwjgl-natives.jar"]
        );
    }

    #[test]
    fn classpath_ends_with_client_jar_and_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = LibraryManager::new(dir.path().to_path_buf());
        let present = dir.path().join("com/mojang/brigadier.jar");
        std::fs::create_dir_all(present.parent().unwrap()).unwrap();
        std::fs::write(&present, b"").unwrap();

        let client = dir.path().join("client.jar");
        let classpath = manager.build_classpath(&version_json(), "linux", &client).unwrap();
        let entries: Vec<PathBuf> = env::split_paths(&classpath).collect();
        assert_eq!(entries, vec![present, client]);
    }
}
