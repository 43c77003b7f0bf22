use crate::events::BackendEvent;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub enum AppMsg {
    VersionsLoaded(Result<Vec<String>, String>),
    RetryVersions,
    VersionSelected(String),
    UsernameChanged(String),
    LaunchPressed,
    LaunchFinished(Result<(), String>),
    // Bus events, split by the component that subscribed to them
    Download(BackendEvent),
    Launch(BackendEvent),
    TerminationElapsed,
    SettingsLoaded(Settings),
    ThemeToggled(bool),
    SettingsSaved(Result<(), String>),
}
