use iced::widget::{Space, button, column, combo_box, progress_bar, row, text, text_input};
use iced::{Center, Element, Fill, Theme};

use crate::ui::AppMsg;
use crate::ui::launch::{LaunchController, LaunchStatus};
use crate::ui::progress::ProgressTracker;
use crate::ui::versions::VersionSource;

pub fn header<'a>() -> Element<'a, AppMsg> {
    column![
        text("Minecraft").size(24),
        text("Select the Minecraft version you want to play and enter your username.").size(14),
    ]
    .spacing(6)
    .into()
}

pub fn version_selector<'a>(versions: &'a VersionSource, launch: &'a LaunchController) -> Element<'a, AppMsg> {
    let placeholder = if versions.is_loading() {
        "Loading versions..."
    } else if versions.versions().is_empty() {
        "No versions available"
    } else {
        "Select version..."
    };
    let selector = combo_box(
        versions.combo_state(),
        placeholder,
        launch.selected_version(),
        AppMsg::VersionSelected,
    )
    .width(Fill);

    let mut field = column![text("Minecraft version").size(14), selector].spacing(4);

    if let Some(error) = versions.error() {
        field = field.push(
            row![
                text(format!("Could not load versions: {}", error)).size(12).width(Fill),
                button(text("Retry").size(12)).on_press(AppMsg::RetryVersions),
            ]
            .spacing(8)
            .align_y(Center),
        );
    }

    field.into()
}

pub fn username_field<'a>(launch: &'a LaunchController) -> Element<'a, AppMsg> {
    column![
        text("Your username").size(14),
        text_input("Type your username here.", launch.username()).on_input(AppMsg::UsernameChanged),
    ]
    .spacing(4)
    .into()
}

/// Enabled iff the controller is ready; the label doubles as status text.
pub fn launch_button<'a>(launch: &'a LaunchController) -> Element<'a, AppMsg> {
    let style: fn(&Theme, button::Status) -> button::Style = match launch.status() {
        LaunchStatus::Launching(_) | LaunchStatus::Terminated => button::success,
        _ => button::primary,
    };

    button(text(launch.label()).width(Fill).align_x(Center))
        .width(Fill)
        .style(style)
        .on_press_maybe(launch.is_ready().then_some(AppMsg::LaunchPressed))
        .into()
}

/// Files caption for an open download session; `None` while hidden.
fn progress_caption(progress: &ProgressTracker) -> Option<String> {
    if !progress.is_visible() {
        return None;
    }
    let session = progress.session();
    Some(match session.total_units {
        Some(total) => format!("{} / {} files", session.completed_units, total),
        None => String::new(),
    })
}

/// Nothing is laid out while no download session is open.
pub fn download_progress<'a>(progress: &ProgressTracker) -> Element<'a, AppMsg> {
    let Some(caption) = progress_caption(progress) else {
        return Space::with_height(0).into();
    };

    column![
        progress_bar(0.0..=100.0, progress.percent()).height(8),
        text(caption).size(12),
    ]
    .spacing(4)
    .into()
}
