use regex::Regex;
use tracing::{debug, info};

use crate::checks;
use crate::error::{ConfigError, FetchError};
use crate::settings::Settings;
use crate::source::{PullRequestData, PullRequestRef, PullRequestSource};
use crate::step::{CheckStep, Control, StepId};

/// Result of running the pipeline, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub steps: Vec<CheckStep>,
    pub errors: usize,
    pub stopped_early: bool,
}

/// Fetches the pull request at most once per successful call.
struct PullRequestCache<S> {
    source: S,
    target: PullRequestRef,
    cached: Option<PullRequestData>,
}

impl<S: PullRequestSource> PullRequestCache<S> {
    fn get(&mut self) -> Result<&PullRequestData, FetchError> {
        let data = match self.cached.take() {
            Some(data) => {
                debug!(target: "prgate.checker", pull_request = %self.target, "reusing fetched pull request");
                data
            }
            None => {
                debug!(target: "prgate.checker", pull_request = %self.target, "fetching pull request");
                self.source
                    .fetch(&self.target.owner, &self.target.repo, self.target.number)?
            }
        };
        let data: &PullRequestData = self.cached.insert(data);
        Ok(data)
    }
}

/// Runs the gate checks against one pull request.
///
/// Checks are chained in order; each appends one step. Once a step asks the
/// pipeline to stop, the remaining chained checks do nothing.
pub struct PullRequestChecker<S> {
    settings: Settings,
    title_pattern: Option<Regex>,
    pull_request: PullRequestCache<S>,
    steps: Vec<CheckStep>,
    errors: usize,
    control: Control,
}

impl<S: PullRequestSource> PullRequestChecker<S> {
    pub fn new(settings: Settings, target: PullRequestRef, source: S) -> Result<Self, ConfigError> {
        let title_pattern = settings.title_pattern()?;
        Ok(Self {
            settings,
            title_pattern,
            pull_request: PullRequestCache {
                source,
                target,
                cached: None,
            },
            steps: Vec::new(),
            errors: 0,
            control: Control::Continue,
        })
    }

    /// Runs every check in pipeline order: labels, prefixes, regexp, checklist.
    pub fn run(mut self) -> RunOutcome {
        self.check_labels()
            .check_prefixes()
            .check_regexp()
            .check_checklist();
        self.into_outcome()
    }

    pub fn check_labels(&mut self) -> &mut Self {
        if self.is_stopped() {
            return self;
        }
        let step = if self.settings.skip_on_labels.is_empty() {
            CheckStep::skip(StepId::Labels, checks::LABELS_SKIP_MSG)
        } else {
            match self.pull_request.get() {
                Ok(pr) => checks::check_labels(&self.settings.skip_on_labels, &pr.labels),
                Err(err) => {
                    checks::fetch_failure(StepId::Labels, &err, self.settings.ignore_github_error)
                }
            }
        };
        self.record(step)
    }

    pub fn check_prefixes(&mut self) -> &mut Self {
        if self.is_stopped() {
            return self;
        }
        let step = checks::check_prefixes(&self.settings);
        self.record(step)
    }

    pub fn check_regexp(&mut self) -> &mut Self {
        if self.is_stopped() {
            return self;
        }
        let step = checks::check_regexp(&self.settings.title, self.title_pattern.as_ref());
        self.record(step)
    }

    pub fn check_checklist(&mut self) -> &mut Self {
        if self.is_stopped() {
            return self;
        }
        let step = if !self.settings.checklist {
            CheckStep::skip(StepId::Checklist, checks::CHECKLIST_SKIP_MSG)
        } else {
            match self.pull_request.get() {
                Ok(pr) => checks::check_checklist(&pr.body, &self.settings.checklist_title),
                Err(err) => checks::fetch_failure(
                    StepId::Checklist,
                    &err,
                    self.settings.ignore_github_error,
                ),
            }
        };
        self.record(step)
    }

    pub fn steps(&self) -> &[CheckStep] {
        &self.steps
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn is_stopped(&self) -> bool {
        self.control == Control::StopSuccess
    }

    pub fn into_outcome(self) -> RunOutcome {
        RunOutcome {
            stopped_early: self.is_stopped(),
            steps: self.steps,
            errors: self.errors,
        }
    }

    fn record(&mut self, step: CheckStep) -> &mut Self {
        debug!(
            target: "prgate.checker",
            step = %step.id,
            status = ?step.status,
            message = %step.message,
            "check finished"
        );
        if step.is_error() {
            self.errors += 1;
        }
        self.control = step.control();
        if self.is_stopped() {
            info!(target: "prgate.checker", step = %step.id, "skip label found, remaining checks skipped");
        }
        self.steps.push(step);
        self
    }
}
