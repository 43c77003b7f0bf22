mod config;
mod error;
mod events;
mod java_manager;
mod launcher;
mod library_manager;
mod models;
mod settings;
mod ui;
mod utils;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_CONCURRENCY, LauncherConfig};
use crate::events::EventBus;
use crate::launcher::MinecraftLauncher;
use crate::settings::ShellConfig;
use crate::ui::AppModel;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory to download files into (default: ~/.minecraft-lite)
    #[arg(short, long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Number of parallel downloads
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    parallel: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("mclite=info")).init();

    let args = Args::parse();
    let config = LauncherConfig::new(args.dir, args.parallel)?;
    log::info!("Using {}", config.minecraft_dir.display());

    let events = EventBus::new();
    let launcher = MinecraftLauncher::new(config, events.clone())?;
    let shell = ShellConfig::default();

    iced::application("Minecraft Lite", AppModel::update, AppModel::view)
        .subscription(AppModel::subscription)
        .theme(AppModel::theme)
        .window_size((1024.0, 768.0))
        .run_with(move || AppModel::new(launcher, events, shell))?;

    Ok(())
}
