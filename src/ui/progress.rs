use crate::events::{BackendEvent, Topic};

/// State of the current download, driven only by backend events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadSession {
    pub total_units: Option<u64>,
    pub completed_units: u64,
    pub visible: bool,
    percent: f32,
}

/// `completed / total` as a percentage in [0, 100]. `None` without a usable total.
pub fn percentage(completed: u64, total: u64) -> Option<f32> {
    if total == 0 {
        return None;
    }
    let pct = completed as f64 / total as f64 * 100.0;
    Some(pct.clamp(0.0, 100.0) as f32)
}

#[derive(Debug, Default)]
pub struct ProgressTracker {
    session: DownloadSession,
}

impl ProgressTracker {
    pub const TOPICS: &'static [Topic] = &[Topic::DownloadStart, Topic::DownloadProgress, Topic::DownloadFinished];

    pub fn session(&self) -> &DownloadSession {
        &self.session
    }

    pub fn is_visible(&self) -> bool {
        self.session.visible
    }

    /// Displayed percentage, always within [0, 100].
    pub fn percent(&self) -> f32 {
        self.session.percent
    }

    pub fn apply(&mut self, event: &BackendEvent) {
        match event {
            BackendEvent::DownloadStart { total } => self.on_start(*total),
            BackendEvent::DownloadProgress { progress, remaining } => self.on_progress(*progress, *remaining),
            BackendEvent::DownloadFinished => self.on_finished(),
            BackendEvent::Launching { .. } => {}
        }
    }

    fn on_start(&mut self, total: u64) {
        self.session = DownloadSession {
            total_units: Some(total),
            completed_units: 0,
            visible: true,
            percent: 0.0,
        };
    }

    // `remaining` is informational only.
    fn on_progress(&mut self, progress: Option<u64>, _remaining: Option<u64>) {
        if !self.session.visible {
            return;
        }
        let (Some(progress), Some(total)) = (progress, self.session.total_units) else {
            log::debug!("Ignoring progress without payload or total");
            return;
        };
        self.session.completed_units = progress;
        if let Some(pct) = percentage(progress, total) {
            self.session.percent = pct;
        }
    }

    fn on_finished(&mut self) {
        self.session.percent = 100.0;
        self.session.visible = false;
    }

    /// Hides an unfinished session, e.g. after the launch request failed.
    pub fn abandon(&mut self) {
        self.session.visible = false;
    }
}
