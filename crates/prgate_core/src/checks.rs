//! The individual gate checks. Each one is a pure function producing exactly
//! one step; counting errors and stopping the pipeline is left to the caller.

use regex::Regex;
use tracing::{debug, trace};

use crate::checklist::find_section;
use crate::error::FetchError;
use crate::settings::{CsvList, Settings};
use crate::step::{CheckStep, StepId};

pub const PREFIX_SKIP_MSG: &str = "No prefixes to check";
pub const PREFIX_SUCCESS_MSG: &str = "Prefixes check passed";
pub const REGEXP_SKIP_MSG: &str = "No regexp to check";
pub const REGEXP_ERR_MSG: &str = "PR title does not match specified regular expression";
pub const REGEXP_SUCCESS_MSG: &str = "Regular expression check passed";
pub const LABELS_SKIP_MSG: &str = "No labels to check";
pub const LABELS_SUCCESS_MSG: &str = "Labels check passed";
pub const CHECKLIST_SKIP_MSG: &str = "Checklist checks disabled";
pub const CHECKLIST_SUCCESS_MSG: &str = "Checklist check passed";

/// More unchecked items than this fails the checklist check.
pub const UNCHECKED_ITEMS_ALLOWED: usize = 1;

pub fn check_prefixes(settings: &Settings) -> CheckStep {
    if settings.prefixes.is_empty() {
        return CheckStep::skip(StepId::Prefix, PREFIX_SKIP_MSG);
    }

    let title = settings.title.to_lowercase();
    let matched = settings
        .prefixes
        .items()
        .iter()
        .any(|prefix| title.starts_with(&prefix.to_lowercase()));

    if matched {
        CheckStep::success(StepId::Prefix, PREFIX_SUCCESS_MSG)
    } else {
        CheckStep::error(
            StepId::Prefix,
            format!(
                "PR title does not have any required prefix ({})",
                settings.prefixes
            ),
        )
    }
}

pub fn check_regexp(title: &str, pattern: Option<&Regex>) -> CheckStep {
    match pattern {
        None => CheckStep::skip(StepId::Regexp, REGEXP_SKIP_MSG),
        Some(regex) if regex.is_match(title) => {
            CheckStep::success(StepId::Regexp, REGEXP_SUCCESS_MSG)
        }
        Some(_) => CheckStep::error(StepId::Regexp, REGEXP_ERR_MSG),
    }
}

/// Evaluates fetched labels against the configured skip labels. Callers
/// handle the "nothing configured" case before fetching.
pub fn check_labels(skip_on_labels: &CsvList, labels: &[String]) -> CheckStep {
    let found = skip_on_labels
        .items()
        .iter()
        .find(|skip| labels.iter().any(|label| label == *skip));

    match found {
        Some(label) => CheckStep::opt_out(
            StepId::Labels,
            format!("Skip label ({label}) detected, skipping remaining checks"),
        ),
        None => CheckStep::success(StepId::Labels, LABELS_SUCCESS_MSG),
    }
}

pub fn check_checklist(body: &str, checklist_title: &str) -> CheckStep {
    let section = find_section(body, checklist_title);
    let unchecked = section.unchecked();
    debug!(
        target: "prgate.checker",
        items = section.items().len(),
        checked = section.checked(),
        unchecked,
        "checklist section parsed"
    );
    for item in section.items().iter().filter(|item| !item.checked) {
        trace!(target: "prgate.checker", item = item.text, "unchecked checklist item");
    }
    if unchecked > UNCHECKED_ITEMS_ALLOWED {
        CheckStep::error(
            StepId::Checklist,
            format!("Found {unchecked} unchecked checklist items"),
        )
    } else {
        CheckStep::success(StepId::Checklist, CHECKLIST_SUCCESS_MSG)
    }
}

/// Converts a failed fetch into the step for `id`, honouring the ignore policy.
pub fn fetch_failure(id: StepId, err: &FetchError, ignore_github_error: bool) -> CheckStep {
    if ignore_github_error {
        CheckStep::skip(id, err.to_string())
    } else {
        CheckStep::error(id, err.to_string())
    }
}
