use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::github::DEFAULT_API_URL;
use crate::settings::{CsvList, Settings, DEFAULT_CHECKLIST_TITLE};
use crate::source::PullRequestRef;

/// Unresolved configuration. Every field is optional so a file and the
/// command line can each supply part of it.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct GateConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub github: GitHubConfig,
}

impl GateConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(data)
    }

    /// Layers `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: GateConfig) -> Self {
        Self {
            policy: self.policy.merge(overrides.policy),
            github: self.github.merge(overrides.github),
        }
    }

    /// Applies defaults and validates everything a run needs.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let GateConfig { policy, github } = self;

        let settings = Settings {
            ignore_github_error: policy.ignore_github_error_enabled(),
            checklist: policy.checklist_enabled(),
            checklist_title: policy
                .checklist_title
                .unwrap_or_else(|| DEFAULT_CHECKLIST_TITLE.to_owned()),
            prefixes: CsvList::parse(policy.prefixes.unwrap_or_default()),
            regexp: policy.regexp.unwrap_or_default(),
            skip_on_labels: CsvList::parse(policy.skip_on_labels.unwrap_or_default()),
            title: required(policy.title, "title")?,
        };
        if settings.checklist && settings.checklist_title.trim().is_empty() {
            return Err(ConfigError::EmptyChecklistTitle);
        }
        settings.title_pattern()?;

        let number = github
            .pull_request
            .ok_or(ConfigError::Missing("pull_request"))?;
        if number == 0 {
            return Err(ConfigError::InvalidPullRequest);
        }
        let pull_request = PullRequestRef::new(
            required(github.owner, "owner")?,
            required(github.repo, "repo")?,
            number,
        );
        let access = GitHubAccess {
            token: required(github.token, "token")?,
            api_url: github
                .api_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
        };

        debug!(
            target: "prgate.config",
            pull_request = %pull_request,
            api_url = %access.api_url,
            checklist = settings.checklist,
            "configuration resolved"
        );
        Ok(ResolvedConfig {
            settings,
            pull_request,
            github: access,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    #[serde(default)]
    pub prefixes: Option<String>,
    #[serde(default)]
    pub regexp: Option<String>,
    #[serde(default)]
    pub skip_on_labels: Option<String>,
    #[serde(default)]
    pub ignore_github_error: Option<bool>,
    #[serde(default)]
    pub checklist: Option<bool>,
    #[serde(default)]
    pub checklist_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl PolicyConfig {
    pub fn ignore_github_error_enabled(&self) -> bool {
        self.ignore_github_error.unwrap_or(true)
    }

    pub fn checklist_enabled(&self) -> bool {
        self.checklist.unwrap_or(false)
    }

    fn merge(self, over: PolicyConfig) -> Self {
        Self {
            prefixes: over.prefixes.or(self.prefixes),
            regexp: over.regexp.or(self.regexp),
            skip_on_labels: over.skip_on_labels.or(self.skip_on_labels),
            ignore_github_error: over.ignore_github_error.or(self.ignore_github_error),
            checklist: over.checklist.or(self.checklist),
            checklist_title: over.checklist_title.or(self.checklist_title),
            title: over.title.or(self.title),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub pull_request: Option<u64>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
}

impl GitHubConfig {
    fn merge(self, over: GitHubConfig) -> Self {
        Self {
            owner: over.owner.or(self.owner),
            repo: over.repo.or(self.repo),
            pull_request: over.pull_request.or(self.pull_request),
            token: over.token.or(self.token),
            api_url: over.api_url.or(self.api_url),
        }
    }
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: Settings,
    pub pull_request: PullRequestRef,
    pub github: GitHubAccess,
}

#[derive(Clone)]
pub struct GitHubAccess {
    pub token: String,
    pub api_url: String,
}

impl fmt::Debug for GitHubAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubAccess")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}
