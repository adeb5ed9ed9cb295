use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GitHubAccess;
use crate::error::FetchError;
use crate::source::{PullRequestData, PullRequestRef, PullRequestSource};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// Blocking GitHub REST client for the pulls endpoint.
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(access: &GitHubAccess) -> Result<Self, FetchError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", access.token))
            .map_err(|err| FetchError::Client(format!("invalid token: {err}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("prgate/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;

        Ok(Self {
            http,
            api_url: access.api_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn pull_request_url(&self, owner: &str, repo: &str, number: u64) -> String {
        format!("{}/repos/{owner}/{repo}/pulls/{number}", self.api_url)
    }
}

impl PullRequestSource for GitHubClient {
    fn fetch(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestData, FetchError> {
        let url = self.pull_request_url(owner, repo, number);
        debug!(target: "prgate.github", %url, "requesting pull request");

        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(target: "prgate.github", status = status.as_u16(), %url, "github returned an error status");
            return Err(status_error(status, PullRequestRef::new(owner, repo, number)));
        }

        let data = response.text()?;
        decode_pull_request(&data)
    }
}

fn status_error(status: StatusCode, pull_request: PullRequestRef) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => FetchError::NotFound(pull_request),
        _ => FetchError::Status {
            status: status.as_u16(),
            pull_request,
        },
    }
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    #[serde(default)]
    labels: Vec<LabelPayload>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    name: String,
}

fn decode_pull_request(data: &str) -> Result<PullRequestData, FetchError> {
    let payload: PullRequestPayload =
        serde_json::from_str(data).map_err(|err| FetchError::Decode(err.to_string()))?;
    Ok(PullRequestData {
        labels: payload.labels.into_iter().map(|label| label.name).collect(),
        body: payload.body.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(api_url: &str) -> GitHubAccess {
        GitHubAccess {
            token: "token".into(),
            api_url: api_url.into(),
        }
    }

    #[test]
    fn builds_pulls_url_without_double_slash() {
        let client = GitHubClient::new(&access("https://ghe.example.com/api/v3/")).unwrap();
        assert_eq!(
            client.pull_request_url("octo", "gate", 5),
            "https://ghe.example.com/api/v3/repos/octo/gate/pulls/5"
        );
    }

    #[test]
    fn rejects_token_with_newline() {
        let mut bad = access(DEFAULT_API_URL);
        bad.token = "abc\ndef".into();
        assert!(matches!(GitHubClient::new(&bad), Err(FetchError::Client(_))));
    }

    #[test]
    fn decodes_labels_and_body() {
        let data = r###"{
            "number": 5,
            "title": "feat: x",
            "labels": [{"id": 1, "name": "bug"}, {"id": 2, "name": "skip-ci"}],
            "body": "## Checklist\n- [x] done"
        }"###;
        let pr = decode_pull_request(data).unwrap();
        assert_eq!(pr.labels, ["bug", "skip-ci"]);
        assert_eq!(pr.body, "## Checklist\n- [x] done");
    }

    #[test]
    fn null_body_decodes_as_empty() {
        let pr = decode_pull_request(r#"{"labels": [], "body": null}"#).unwrap();
        assert!(pr.labels.is_empty());
        assert_eq!(pr.body, "");
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let err = decode_pull_request(r#"{"labels": "nope"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        let pr = PullRequestRef::new("octo", "gate", 5);
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, pr.clone()),
            FetchError::Auth { status: 403 }
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, pr.clone()),
            FetchError::NotFound(pr.clone())
        );
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, pr.clone()).to_string(),
            "unexpected status 502 from github for pull request octo/gate#5"
        );
    }
}
