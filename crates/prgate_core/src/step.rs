use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies which check produced a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Prefix,
    Regexp,
    Labels,
    Checklist,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Prefix => "prefix",
            StepId::Regexp => "regexp",
            StepId::Labels => "labels",
            StepId::Checklist => "checklist",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Error,
    Skip,
}

impl StepStatus {
    /// Console glyph printed in front of a step line.
    pub fn glyph(self) -> &'static str {
        match self {
            StepStatus::Success => "✅",
            StepStatus::Error => "❌",
            StepStatus::Skip => "🦘",
        }
    }
}

/// Whether the pipeline keeps evaluating checks after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    StopSuccess,
}

/// Recorded outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStep {
    pub id: StepId,
    pub status: StepStatus,
    pub message: String,
    #[serde(default)]
    pub exit: bool,
}

impl CheckStep {
    pub fn success(id: StepId, message: impl Into<String>) -> Self {
        Self::new(id, StepStatus::Success, message)
    }

    pub fn error(id: StepId, message: impl Into<String>) -> Self {
        Self::new(id, StepStatus::Error, message)
    }

    pub fn skip(id: StepId, message: impl Into<String>) -> Self {
        Self::new(id, StepStatus::Skip, message)
    }

    /// A skip that also stops the pipeline. Only the labels check emits one.
    pub fn opt_out(id: StepId, message: impl Into<String>) -> Self {
        Self {
            exit: true,
            ..Self::skip(id, message)
        }
    }

    fn new(id: StepId, status: StepStatus, message: impl Into<String>) -> Self {
        Self {
            id,
            status,
            message: message.into(),
            exit: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == StepStatus::Error
    }

    pub fn control(&self) -> Control {
        if self.exit {
            Control::StopSuccess
        } else {
            Control::Continue
        }
    }
}
