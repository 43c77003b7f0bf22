use iced::widget::combo_box;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Selectable version ids, fetched once per activation.
pub struct VersionSource {
    versions: Vec<String>,
    fetch: FetchState,
    combo: combo_box::State<String>,
}

impl Default for VersionSource {
    fn default() -> Self {
        Self {
            versions: Vec::new(),
            fetch: FetchState::Idle,
            combo: combo_box::State::new(Vec::new()),
        }
    }
}

impl VersionSource {
    /// Returns true when the caller must start the fetch. Only the first
    /// activation does.
    pub fn activate(&mut self) -> bool {
        if self.fetch != FetchState::Idle {
            return false;
        }
        self.fetch = FetchState::Loading;
        true
    }

    /// Re-arms a failed fetch. Returns true when the caller must fetch again.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.fetch, FetchState::Failed(_)) {
            return false;
        }
        self.fetch = FetchState::Loading;
        true
    }

    /// Success replaces the list whole; failure keeps whatever was there.
    pub fn resolve(&mut self, result: Result<Vec<String>, String>) {
        match result {
            Ok(versions) => {
                self.combo = combo_box::State::new(versions.clone());
                self.versions = versions;
                self.fetch = FetchState::Loaded;
            }
            Err(e) => {
                log::warn!("Failed to load versions: {}", e);
                self.fetch = FetchState::Failed(e);
            }
        }
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn combo_state(&self) -> &combo_box::State<String> {
        &self.combo
    }

    pub fn is_loading(&self) -> bool {
        self.fetch == FetchState::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.fetch {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_activation_fetches() {
        let mut source = VersionSource::default();
        assert!(source.versions().is_empty());
        assert!(source.activate());
        assert!(!source.activate());
        assert!(source.is_loading());

        source.resolve(Ok(vec!["1.20.1".into()]));
        assert!(!source.activate());
    }

    #[test]
    fn success_replaces_list_in_backend_order() {
        let mut source = VersionSource::default();
        source.activate();
        source.resolve(Ok(vec!["1.20.1".into(), "1.19.4".into()]));
        assert_eq!(source.versions(), ["1.20.1", "1.19.4"]);

        source.resolve(Ok(vec!["1.21".into()]));
        assert_eq!(source.versions(), ["1.21"]);
    }

    #[test]
    fn failure_keeps_list_and_allows_retry() {
        let mut source = VersionSource::default();
        source.activate();
        source.resolve(Ok(vec!["1.20.1".into()]));

        assert!(!source.retry());
        source.resolve(Err("connection refused".into()));
        assert_eq!(source.versions(), ["1.20.1"]);
        assert_eq!(source.error(), Some("connection refused"));

        assert!(source.retry());
        assert!(source.error().is_none());
        assert!(!source.retry());
    }
}
