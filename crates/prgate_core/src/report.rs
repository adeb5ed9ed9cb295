use std::io::{self, Write};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::checker::RunOutcome;
use crate::source::PullRequestRef;
use crate::step::CheckStep;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateReport {
    pub id: String,
    pub timestamp: String,
    pub pull_request: PullRequestRef,
    pub summary: ReportSummary,
    pub steps: Vec<CheckStep>,
}

impl GateReport {
    pub fn new(id: impl Into<String>, pull_request: PullRequestRef, outcome: RunOutcome) -> Self {
        let status = summarize(&outcome);
        Self {
            id: id.into(),
            timestamp: Utc::now().to_rfc3339(),
            pull_request,
            summary: ReportSummary {
                status,
                errors: outcome.errors,
                stopped_early: outcome.stopped_early,
            },
            steps: outcome.steps,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary.status != ReportStatus::Fail
    }

    /// Writes one console line per step, stopping after an opt-out step.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for step in &self.steps {
            writeln!(out, "{}", format_step(step))?;
            if step.exit {
                break;
            }
        }
        Ok(())
    }
}

fn summarize(outcome: &RunOutcome) -> ReportStatus {
    if outcome.stopped_early {
        ReportStatus::OptedOut
    } else if outcome.errors > 0 {
        ReportStatus::Fail
    } else {
        ReportStatus::Pass
    }
}

pub fn format_step(step: &CheckStep) -> String {
    format!(
        "{} step={} message={}",
        step.status.glyph(),
        step.id,
        step.message.to_lowercase()
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub status: ReportStatus,
    pub errors: usize,
    pub stopped_early: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Fail,
    OptedOut,
}
