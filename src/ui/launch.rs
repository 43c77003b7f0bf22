use std::time::Duration;

use crate::events::{BackendEvent, Topic};
use crate::models::LaunchRequest;

/// Grace period between the game starting and the launcher exiting.
pub const TERMINATION_DELAY: Duration = Duration::from_millis(5000);

const IDLE_LABEL: &str = "Launch";
const DOWNLOADING_LABEL: &str = "Downloading...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStatus {
    Idle,
    /// The request handed to the backend, until it fails or the game starts.
    AwaitingDownload(LaunchRequest),
    Launching(String),
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TimerState {
    #[default]
    Unscheduled,
    Pending,
    Fired,
}

/// One-shot deferred shutdown.
#[derive(Debug, Default)]
pub struct TerminationTimer {
    state: TimerState,
}

impl TerminationTimer {
    /// Returns the delay to wait when this call armed the timer, `None` when
    /// it was already pending or has fired.
    pub fn schedule(&mut self) -> Option<Duration> {
        if self.state != TimerState::Unscheduled {
            return None;
        }
        self.state = TimerState::Pending;
        Some(TERMINATION_DELAY)
    }

    /// True exactly once, for the wake-up of the pending timer.
    pub fn fire(&mut self) -> bool {
        if self.state != TimerState::Pending {
            return false;
        }
        self.state = TimerState::Fired;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.state == TimerState::Pending
    }
}

/// Resolves `delay` after this call; the shell turns the wake-up into a message.
pub fn countdown(delay: Duration) -> impl Future<Output = ()> + Send + 'static {
    let deadline = tokio::time::Instant::now() + delay;
    async move { tokio::time::sleep_until(deadline).await }
}

#[derive(Debug)]
pub struct LaunchController {
    version: String,
    username: String,
    status: LaunchStatus,
    label: String,
    timer: TerminationTimer,
}

impl Default for LaunchController {
    fn default() -> Self {
        Self {
            version: String::new(),
            username: String::new(),
            status: LaunchStatus::Idle,
            label: IDLE_LABEL.to_string(),
            timer: TerminationTimer::default(),
        }
    }
}

impl LaunchController {
    pub const TOPICS: &'static [Topic] = &[Topic::Launching];

    pub fn select_version(&mut self, version: String) {
        self.version = version;
    }

    pub fn set_username(&mut self, username: String) {
        self.username = username;
    }

    pub fn selected_version(&self) -> Option<&String> {
        (!self.version.is_empty()).then_some(&self.version)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn status(&self) -> &LaunchStatus {
        &self.status
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_ready(&self) -> bool {
        !self.version.is_empty() && !self.username.is_empty()
    }

    pub fn is_terminated(&self) -> bool {
        self.status == LaunchStatus::Terminated
    }

    /// Builds the request to send to the backend. Only an idle, ready
    /// controller submits; anything else returns `None`.
    pub fn submit(&mut self) -> Option<LaunchRequest> {
        if !self.is_ready() {
            return None;
        }
        if self.status != LaunchStatus::Idle {
            log::debug!("Ignoring launch while {:?}", self.status);
            return None;
        }
        let request = LaunchRequest {
            version: self.version.clone(),
            username: self.username.clone(),
        };
        self.status = LaunchStatus::AwaitingDownload(request.clone());
        self.label = DOWNLOADING_LABEL.to_string();
        Some(request)
    }

    /// Backend rejected the launch: back to idle with the error shown.
    pub fn on_launch_failed(&mut self, error: &str) {
        let LaunchStatus::AwaitingDownload(request) = &self.status else {
            log::warn!("Launch error after game start: {}", error);
            return;
        };
        log::debug!("Launch of {} for {} failed", request.version, request.username);
        self.status = LaunchStatus::Idle;
        self.label = format!("Launch failed: {}", error);
    }

    /// Reacts to a `launching` signal. Returns the delay after which the
    /// shell must call [`Self::on_termination_elapsed`], or `None` when a
    /// countdown is already running.
    pub fn on_launching(&mut self, id: String) -> Option<Duration> {
        if self.timer.is_pending() {
            log::debug!("Duplicate launching signal for {} ignored", id);
            return None;
        }
        let delay = self.timer.schedule()?;
        self.label = format!("Launching Minecraft {}", id);
        self.status = LaunchStatus::Launching(id);
        Some(delay)
    }

    pub fn apply(&mut self, event: &BackendEvent) -> Option<Duration> {
        match event {
            BackendEvent::Launching { id } => self.on_launching(id.clone()),
            _ => None,
        }
    }

    /// True exactly once: the moment the host must terminate.
    pub fn on_termination_elapsed(&mut self) -> bool {
        if !self.timer.fire() {
            return false;
        }
        self.status = LaunchStatus::Terminated;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ready(version: &str, username: &str) -> LaunchController {
        let mut controller = LaunchController::default();
        controller.select_version(version.to_string());
        controller.set_username(username.to_string());
        controller
    }

    #[test]
    fn ready_iff_both_fields_set() {
        for (version, username) in [("", ""), ("1.20.1", ""), ("", "Steve"), ("1.20.1", "Steve")] {
            let controller = ready(version, username);
            let disabled = version.is_empty() || username.is_empty();
            assert_eq!(controller.is_ready(), !disabled, "{version:?} / {username:?}");
        }
    }

    #[test]
    fn submit_builds_request_and_shows_downloading() {
        let mut controller = ready("1.20.1", "Steve");
        assert_eq!(controller.label(), "Launch");

        let request = controller.submit().unwrap();
        assert_eq!(
            request,
            LaunchRequest { version: "1.20.1".into(), username: "Steve".into() }
        );
        assert_eq!(controller.status(), &LaunchStatus::AwaitingDownload(request));
        assert_eq!(controller.label(), "Downloading...");
        assert!(controller.submit().is_none());
    }

    #[test]
    fn submit_requires_readiness() {
        let mut controller = ready("1.20.1", "");
        assert!(controller.submit().is_none());
        assert_eq!(controller.status(), &LaunchStatus::Idle);
    }

    #[test]
    fn failed_launch_returns_to_idle() {
        let mut controller = ready("1.20.1", "Steve");
        controller.submit();
        controller.on_launch_failed("version 1.20.1 not found");

        assert_eq!(controller.status(), &LaunchStatus::Idle);
        assert!(controller.label().contains("not found"));
        assert!(controller.submit().is_some());
    }

    #[test]
    fn launching_sets_label_and_schedules_once() {
        let mut controller = ready("1.20.1", "Steve");
        controller.submit();

        let event = BackendEvent::Launching { id: "abc123".into() };
        assert_eq!(controller.apply(&event), Some(TERMINATION_DELAY));
        assert!(controller.label().contains("abc123"));
        assert_eq!(controller.status(), &LaunchStatus::Launching("abc123".into()));

        assert_eq!(controller.apply(&event), None);
        assert_eq!(controller.apply(&BackendEvent::DownloadFinished), None);
    }

    #[test]
    fn timer_fires_only_when_pending() {
        let mut timer = TerminationTimer::default();
        assert!(!timer.fire());
        assert_eq!(timer.schedule(), Some(TERMINATION_DELAY));
        assert!(timer.is_pending());
        assert_eq!(timer.schedule(), None);
        assert!(timer.fire());
        assert!(!timer.fire());
        assert_eq!(timer.schedule(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn terminates_once_after_grace_period() {
        let mut controller = ready("1.20.1", "Steve");
        controller.submit();
        let terminations = Arc::new(AtomicUsize::new(0));

        let mut countdowns = Vec::new();
        for _ in 0..2 {
            if let Some(delay) = controller.on_launching("abc123".into()) {
                countdowns.push(tokio::spawn(countdown(delay)));
            }
        }
        assert_eq!(countdowns.len(), 1);
        assert!(controller.label().contains("abc123"));

        tokio::time::advance(Duration::from_millis(4999)).await;
        assert!(!countdowns[0].is_finished());

        tokio::time::advance(Duration::from_millis(1)).await;
        for countdown in countdowns {
            countdown.await.unwrap();
            if controller.on_termination_elapsed() {
                terminations.fetch_add(1, Ordering::SeqCst);
            }
        }
        if controller.on_termination_elapsed() {
            terminations.fetch_add(1, Ordering::SeqCst);
        }

        assert_eq!(terminations.load(Ordering::SeqCst), 1);
        assert!(controller.is_terminated());
        assert_eq!(controller.on_launching("abc123".into()), None);
    }
}
