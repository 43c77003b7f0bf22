use thiserror::Error;

/// Failures of the launch sequence that the UI reports back to the user.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("version {0} not found")]
    VersionNotFound(String),

    #[error("version {0} has no client download")]
    MissingClient(String),

    #[error("failed to download {url}: {status}")]
    HttpStatus { url: String, status: reqwest::StatusCode },

    #[error("could not find an installed Java runtime")]
    JavaNotFound,
}
