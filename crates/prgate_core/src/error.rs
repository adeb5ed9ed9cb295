use std::path::PathBuf;

use thiserror::Error;

use crate::source::PullRequestRef;

/// Fatal problems found before any check runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    #[error("pull request number must be greater than zero")]
    InvalidPullRequest,
    #[error("checklist title must not be empty when the checklist check is enabled")]
    EmptyChecklistTitle,
    #[error("invalid title regexp `{pattern}`")]
    InvalidRegexp {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure to obtain pull request data from the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("github request failed: {0}")]
    Network(String),
    #[error("github rejected the credentials (status {status})")]
    Auth { status: u16 },
    #[error("pull request {0} not found")]
    NotFound(PullRequestRef),
    #[error("unexpected status {status} from github for pull request {pull_request}")]
    Status {
        status: u16,
        pull_request: PullRequestRef,
    },
    #[error("failed to decode pull request payload: {0}")]
    Decode(String),
    #[error("failed to build github client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
