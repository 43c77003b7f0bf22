use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::fs;
use tokio::process::Command as TokioCommand;

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::events::{BackendEvent, EventBus};
use crate::java_manager::JavaManager;
use crate::library_manager::LibraryManager;
use crate::models::{AssetIndexFile, LaunchRequest, VersionJson, VersionManifest};
use crate::utils::get_os_name;

const MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";
const RESOURCES_URL: &str = "https://resources.download.minecraft.net";
const DEFAULT_MAIN_CLASS: &str = "net.minecraft.client.main.Main";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One file to fetch; skipped when `path` already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub path: PathBuf,
}

/// Backend side of the launcher: resolves versions, downloads a version's
/// files and starts the game, reporting each phase on the event bus.
#[derive(Clone)]
pub struct MinecraftLauncher {
    pub config: LauncherConfig,
    pub java_manager: JavaManager,
    pub library_manager: LibraryManager,
    client: reqwest::Client,
    events: EventBus,
}

impl MinecraftLauncher {
    pub fn new(config: LauncherConfig, events: EventBus) -> Result<Self> {
        Self::with_timeout(config, events, HTTP_TIMEOUT)
    }

    /// Every request, body included, fails once `timeout` has passed.
    fn with_timeout(config: LauncherConfig, events: EventBus, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mclite/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let library_manager = LibraryManager::new(config.libraries_dir.clone());
        Ok(Self {
            config,
            java_manager: JavaManager::new(),
            library_manager,
            client,
            events,
        })
    }

    async fn fetch_manifest(&self) -> Result<VersionManifest> {
        log::info!("Downloading version manifest");
        let response = self.client.get(MANIFEST_URL).send().await?;
        if !response.status().is_success() {
            return Err(LaunchError::HttpStatus {
                url: MANIFEST_URL.to_string(),
                status: response.status(),
            }
            .into());
        }
        Ok(response.json().await?)
    }

    /// Release version ids, in manifest order.
    pub async fn get_available_versions(&self) -> Result<Vec<String>> {
        let manifest = self.fetch_manifest().await?;
        let releases = manifest.release_ids();
        log::info!("Found {} release versions", releases.len());
        Ok(releases)
    }

    async fn fetch_version_json(&self, version: &str) -> Result<VersionJson> {
        let manifest = self.fetch_manifest().await?;
        let info = manifest
            .find(version)
            .ok_or_else(|| LaunchError::VersionNotFound(version.to_string()))?;

        let version_file = self.config.version_json_path(version);
        self.download_file(&info.url, &version_file).await?;

        let data = fs::read_to_string(&version_file).await?;
        serde_json::from_str(&data).with_context(|| format!("Invalid version file {:?}", version_file))
    }

    async fn download_file(&self, url: &str, path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(LaunchError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            }
            .into());
        }
        let bytes = response.bytes().await?;

        // only complete files ever appear under `path`
        let partial = partial_path(path);
        fs::write(&partial, &bytes).await?;
        fs::rename(&partial, path).await?;
        Ok(())
    }

    /// Client jar, libraries and asset objects. Downloads the asset index on
    /// the way since the object list lives in it.
    async fn collect_tasks(&self, version_json: &VersionJson) -> Result<Vec<DownloadTask>> {
        let client = version_json
            .downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
            .ok_or_else(|| LaunchError::MissingClient(version_json.id.clone()))?;

        let mut tasks = vec![DownloadTask {
            url: client.url.clone(),
            path: self.config.client_jar_path(&version_json.id),
        }];
        tasks.extend(self.library_manager.download_tasks(version_json, get_os_name()));

        if let Some(asset_index) = &version_json.asset_index {
            let index_path = self
                .config
                .assets_dir
                .join("indexes")
                .join(format!("{}.json", asset_index.id));
            self.download_file(&asset_index.url, &index_path).await?;

            let index_content = fs::read_to_string(&index_path).await?;
            let index: AssetIndexFile = serde_json::from_str(&index_content)?;
            let objects_dir = self.config.assets_dir.join("objects");
            tasks.extend(index.objects.into_iter().filter_map(|(name, object)| {
                let Some(hash_head) = object.hash.get(0..2).filter(|_| object.hash.len() > 2) else {
                    log::warn!("Skipping asset {} with malformed hash {:?}", name, object.hash);
                    return None;
                };
                Some(DownloadTask {
                    url: format!("{}/{}/{}", RESOURCES_URL, hash_head, object.hash),
                    path: objects_dir.join(hash_head).join(&object.hash),
                })
            }));
        }

        Ok(tasks)
    }

    /// Downloads every task with bounded concurrency. A file that fails is
    /// logged and still counts towards progress.
    async fn download_all(&self, tasks: Vec<DownloadTask>) {
        let total = tasks.len() as u64;
        log::info!("Downloading {} files ({} in parallel)", total, self.config.concurrency);
        self.events.emit(BackendEvent::DownloadStart { total });
        self.events.emit(BackendEvent::progress(0, total));

        let mut downloads = stream::iter(tasks)
            .map(|task| async move {
                let result = self.download_file(&task.url, &task.path).await;
                (task, result)
            })
            .buffer_unordered(self.config.concurrency);

        let mut done = 0u64;
        while let Some((task, result)) = downloads.next().await {
            if let Err(e) = result {
                log::warn!("Failed to download {}: {:#}", task.url, e);
            }
            done += 1;
            self.events.emit(BackendEvent::progress(done, total - done));
        }

        self.events.emit(BackendEvent::DownloadFinished);
    }

    fn build_command(&self, version_json: &VersionJson, username: &str, java_path: &Path) -> Result<TokioCommand> {
        let version = &version_json.id;
        let client_jar = self.config.client_jar_path(version);
        let classpath = self
            .library_manager
            .build_classpath(version_json, get_os_name(), &client_jar)?;
        let main_class = version_json.main_class.as_deref().unwrap_or(DEFAULT_MAIN_CLASS);

        let mut command = TokioCommand::new(java_path);
        command
            .arg("-cp")
            .arg(classpath)
            .arg(main_class)
            .arg("--username")
            .arg(username)
            .arg("--version")
            .arg(version)
            .arg("--gameDir")
            .arg(&self.config.minecraft_dir)
            .arg("--assetsDir")
            .arg(&self.config.assets_dir);

        if let Some(asset_index) = &version_json.asset_index {
            command.arg("--assetIndex").arg(&asset_index.id);
        }

        command
            .arg("--userType")
            .arg("legacy")
            .arg("--accessToken")
            .arg("0")
            .arg("--uuid")
            .arg(uuid::Uuid::new_v4().to_string())
            .current_dir(self.config.version_dir(version))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        Ok(command)
    }

    /// Full launch sequence. Returns once the game process is running; the
    /// `launching` event carries the version id of the started instance.
    pub async fn launch(&self, request: LaunchRequest) -> Result<()> {
        log::info!("Launching {} as {}", request.version, request.username);
        log::debug!("{} listener(s) on the event bus", self.events.subscriber_count());
        self.config.ensure_directories().await?;

        let version_json = self.fetch_version_json(&request.version).await?;
        let tasks = self.collect_tasks(&version_json).await?;
        self.download_all(tasks).await;

        let client_jar = self.config.client_jar_path(&version_json.id);
        if !client_jar.exists() {
            anyhow::bail!("Client jar missing after download: {:?}", client_jar);
        }

        let required_java = version_json.java_version.as_ref().map(|j| j.major_version);
        let java_path = self.java_manager.find_java(required_java)?;
        let mut child = self
            .build_command(&version_json, &request.username, &java_path)?
            .spawn()
            .with_context(|| format!("Failed to start {:?}", java_path))?;

        log::info!("Minecraft {} started (pid {:?})", version_json.id, child.id());
        self.events.emit(BackendEvent::Launching { id: version_json.id.clone() });

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => log::info!("Minecraft exited with {}", status),
                Err(e) => log::warn!("Lost track of Minecraft process: {}", e),
            }
        });

        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
