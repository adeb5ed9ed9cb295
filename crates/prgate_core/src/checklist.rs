//! Extraction of the markdown task list that follows the checklist heading.

use std::sync::OnceLock;

use regex::Regex;

fn item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^- \[([ x])\] (.+)$").expect("checklist item pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistItem<'a> {
    pub checked: bool,
    pub text: &'a str,
}

/// Contiguous run of task-list items found under the heading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistSection<'a> {
    items: Vec<ChecklistItem<'a>>,
}

impl<'a> ChecklistSection<'a> {
    pub fn items(&self) -> &[ChecklistItem<'a>] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unchecked(&self) -> usize {
        self.items.iter().filter(|item| !item.checked).count()
    }

    pub fn checked(&self) -> usize {
        self.items.len() - self.unchecked()
    }
}

/// Finds the first `title` in `body`, skips ahead to the first task-list line
/// and captures every directly following task-list line.
///
/// A missing heading, or a heading with no task list after it, yields an empty
/// section. Only a lowercase `x` counts as checked; `- [X]` ends the run.
pub fn find_section<'a>(body: &'a str, title: &str) -> ChecklistSection<'a> {
    let Some(start) = body.find(title) else {
        return ChecklistSection::default();
    };

    let items = body[start + title.len()..]
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(parse_item)
        .skip_while(Option::is_none)
        .map_while(|item| item)
        .collect();

    ChecklistSection { items }
}

fn parse_item(line: &str) -> Option<ChecklistItem<'_>> {
    let captures = item_pattern().captures(line)?;
    let text = captures.get(2)?.as_str();
    Some(ChecklistItem {
        checked: &captures[1] == "x",
        text,
    })
}
