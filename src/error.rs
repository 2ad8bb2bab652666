//! Errors that can happen when talking to a CalDAV server

use thiserror::Error;
use url::Url;

/// The error type of this crate
#[derive(Debug, Error)]
pub enum CalDavError {
    /// The server URL, the username or the password is missing.
    ///
    /// This is a state rather than a failure: the user just has not configured anything yet.
    #[error("no CalDAV server is configured")]
    NotConfigured,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request did not make it to the server (connection, DNS or TLS failure)
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected HTTP status {status} for {method} {url}")]
    UnexpectedStatus {
        method: String,
        url: Url,
        status: u16,
    },

    #[error("unable to parse server data: {0}")]
    Parse(String),

    /// A task has to be created, but no calendar has been discovered
    #[error("no calendar is available")]
    NoCalendar,

    #[error("no task with UID {0}")]
    UnknownTask(String),

    #[error("a task needs a summary")]
    EmptySummary,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CalDavError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, CalDavError::NotConfigured)
    }
}

impl From<reqwest::Error> for CalDavError {
    fn from(err: reqwest::Error) -> Self {
        CalDavError::Transport(Box::new(err))
    }
}
