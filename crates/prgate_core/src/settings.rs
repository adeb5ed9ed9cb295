use std::fmt;

use regex::Regex;

use crate::error::ConfigError;

pub const DEFAULT_CHECKLIST_TITLE: &str = "## Checklist";

/// Comma-separated setting value. Keeps the configured text so messages can
/// quote it back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvList {
    raw: String,
    items: Vec<String>,
}

impl CsvList {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let items = raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect();
        Self { raw, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for CsvList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for CsvList {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Policy for a single gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub prefixes: CsvList,
    pub regexp: String,
    pub skip_on_labels: CsvList,
    pub ignore_github_error: bool,
    pub checklist: bool,
    pub checklist_title: String,
    pub title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefixes: CsvList::default(),
            regexp: String::new(),
            skip_on_labels: CsvList::default(),
            ignore_github_error: true,
            checklist: false,
            checklist_title: DEFAULT_CHECKLIST_TITLE.to_owned(),
            title: String::new(),
        }
    }
}

impl Settings {
    /// Compiles the title pattern, `None` when no pattern is configured.
    pub fn title_pattern(&self) -> Result<Option<Regex>, ConfigError> {
        if self.regexp.is_empty() {
            return Ok(None);
        }
        Regex::new(&self.regexp)
            .map(Some)
            .map_err(|source| ConfigError::InvalidRegexp {
                pattern: self.regexp.clone(),
                source,
            })
    }
}
