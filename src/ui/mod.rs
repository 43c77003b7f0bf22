pub mod launch;
pub mod msg;
pub mod progress;
pub mod versions;
pub mod widgets;

pub use msg::AppMsg;

use futures::StreamExt;
use iced::widget::{column, container, toggler};
use iced::{Element, Fill, Subscription, Task};
use iced_aw::Card;
use std::path::PathBuf;

use crate::events::EventBus;
use crate::launcher::MinecraftLauncher;
use crate::models::Theme;
use crate::settings::{Settings, ShellConfig};
use crate::ui::launch::{LaunchController, countdown};
use crate::ui::progress::ProgressTracker;
use crate::ui::versions::VersionSource;

/// Single-card shell wiring the version source, the launch controller and
/// the progress tracker together.
pub struct AppModel {
    launcher: MinecraftLauncher,
    events: EventBus,
    settings: Settings,
    settings_path: PathBuf,
    // a user choice made before the stored settings arrive wins over them
    theme_chosen: bool,

    versions: VersionSource,
    launch: LaunchController,
    progress: ProgressTracker,
}

impl AppModel {
    pub fn new(launcher: MinecraftLauncher, events: EventBus, shell: ShellConfig) -> (Self, Task<AppMsg>) {
        let settings_path = shell.settings_path(&launcher.config.minecraft_dir);
        let mut model = AppModel {
            launcher,
            events,
            settings: Settings::new(shell.default_theme),
            settings_path: settings_path.clone(),
            theme_chosen: false,
            versions: VersionSource::default(),
            launch: LaunchController::default(),
            progress: ProgressTracker::default(),
        };

        let load_settings = Task::perform(Settings::load(settings_path, shell.default_theme), AppMsg::SettingsLoaded);
        let load_versions = if model.versions.activate() {
            model.fetch_versions()
        } else {
            Task::none()
        };

        (model, Task::batch([load_settings, load_versions]))
    }

    fn fetch_versions(&self) -> Task<AppMsg> {
        let launcher = self.launcher.clone();
        Task::perform(
            async move { launcher.get_available_versions().await.map_err(|e| format!("{:#}", e)) },
            AppMsg::VersionsLoaded,
        )
    }

    fn save_settings(&self) -> Task<AppMsg> {
        Task::perform(
            self.settings.clone().save(self.settings_path.clone()),
            |result| AppMsg::SettingsSaved(result.map_err(|e| e.to_string())),
        )
    }

    pub fn update(&mut self, msg: AppMsg) -> Task<AppMsg> {
        match msg {
            AppMsg::VersionsLoaded(result) => {
                self.versions.resolve(result);
            }
            AppMsg::RetryVersions => {
                if self.versions.retry() {
                    return self.fetch_versions();
                }
            }
            AppMsg::VersionSelected(version) => {
                self.launch.select_version(version);
            }
            AppMsg::UsernameChanged(username) => {
                self.launch.set_username(username);
            }
            AppMsg::LaunchPressed => {
                if let Some(request) = self.launch.submit() {
                    let launcher = self.launcher.clone();
                    return Task::perform(
                        async move { launcher.launch(request).await.map_err(|e| format!("{:#}", e)) },
                        AppMsg::LaunchFinished,
                    );
                }
            }
            AppMsg::LaunchFinished(Ok(())) => {
                log::debug!("Launch request completed");
            }
            AppMsg::LaunchFinished(Err(e)) => {
                log::error!("Launch failed: {}", e);
                self.launch.on_launch_failed(&e);
                self.progress.abandon();
            }
            AppMsg::Download(event) => {
                self.progress.apply(&event);
            }
            AppMsg::Launch(event) => {
                if let Some(delay) = self.launch.apply(&event) {
                    log::info!("Closing launcher in {:?}", delay);
                    return Task::perform(countdown(delay), |()| AppMsg::TerminationElapsed);
                }
            }
            AppMsg::TerminationElapsed => {
                if self.launch.on_termination_elapsed() {
                    return iced::exit();
                }
            }
            AppMsg::SettingsLoaded(settings) => {
                if self.theme_chosen {
                    log::debug!("Keeping theme picked before settings loaded");
                } else {
                    self.settings = settings;
                }
            }
            AppMsg::ThemeToggled(dark) => {
                self.theme_chosen = true;
                self.settings.theme = if dark { Theme::Dark } else { Theme::Light };
                return self.save_settings();
            }
            AppMsg::SettingsSaved(result) => {
                if let Err(e) = result {
                    log::warn!("Failed to save settings: {}", e);
                }
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, AppMsg> {
        let body = column![
            widgets::version_selector(&self.versions, &self.launch),
            widgets::username_field(&self.launch),
            widgets::launch_button(&self.launch),
            widgets::download_progress(&self.progress),
        ]
        .spacing(12);

        let foot = toggler(self.settings.theme == Theme::Dark)
            .label("Dark mode")
            .on_toggle(AppMsg::ThemeToggled);

        let card = Card::new(widgets::header(), body).foot(foot).max_width(384.0);

        container(card).padding(24).center(Fill).into()
    }

    /// Each component listens on its own topics for as long as it is mounted.
    pub fn subscription(&self) -> Subscription<AppMsg> {
        let mut subscriptions = vec![Subscription::run_with_id(
            "progress-tracker",
            self.events.watch(ProgressTracker::TOPICS).map(AppMsg::Download),
        )];

        if !self.launch.is_terminated() {
            subscriptions.push(Subscription::run_with_id(
                "launch-controller",
                self.events.watch(LaunchController::TOPICS).map(AppMsg::Launch),
            ));
        }

        Subscription::batch(subscriptions)
    }

    pub fn theme(&self) -> iced::Theme {
        match self.settings.theme {
            Theme::Dark => iced::Theme::Dark,
            Theme::Light => iced::Theme::Light,
        }
    }
}
