use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Coordinates of the pull request under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// The parts of a pull request the checks look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestData {
    pub labels: Vec<String>,
    pub body: String,
}

/// Anything that can hand back pull request data.
pub trait PullRequestSource {
    fn fetch(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestData, FetchError>;
}

impl<T: PullRequestSource + ?Sized> PullRequestSource for &T {
    fn fetch(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestData, FetchError> {
        (**self).fetch(owner, repo, number)
    }
}

impl<T: PullRequestSource + ?Sized> PullRequestSource for Box<T> {
    fn fetch(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestData, FetchError> {
        (**self).fetch(owner, repo, number)
    }
}

/// In-memory source returning the same response on every call.
#[derive(Debug)]
pub struct StaticSource {
    response: Result<PullRequestData, FetchError>,
    calls: Cell<usize>,
}

impl StaticSource {
    pub fn new(data: PullRequestData) -> Self {
        Self {
            response: Ok(data),
            calls: Cell::new(0),
        }
    }

    pub fn with_labels<I, L>(labels: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self::new(PullRequestData {
            labels: labels.into_iter().map(Into::into).collect(),
            body: body.into(),
        })
    }

    pub fn failing(err: FetchError) -> Self {
        Self {
            response: Err(err),
            calls: Cell::new(0),
        }
    }

    /// Number of times `fetch` was called.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl PullRequestSource for StaticSource {
    fn fetch(&self, _owner: &str, _repo: &str, _number: u64) -> Result<PullRequestData, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_counts_calls_through_references() {
        let source = StaticSource::with_labels(["bug"], "body");
        let by_ref = &source;
        let data = by_ref.fetch("octo", "repo", 1).unwrap();
        assert_eq!(data.labels, ["bug"]);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn pull_request_ref_display() {
        let pr = PullRequestRef::new("octo", "gate", 42);
        assert_eq!(pr.to_string(), "octo/gate#42");
    }
}
