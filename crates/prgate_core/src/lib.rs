pub mod checker;
pub mod checklist;
pub mod checks;
pub mod config;
pub mod error;
pub mod github;
pub mod report;
pub mod settings;
pub mod source;
pub mod step;

pub use checker::{PullRequestChecker, RunOutcome};
pub use checklist::{find_section, ChecklistItem, ChecklistSection};
pub use config::{GateConfig, GitHubAccess, GitHubConfig, PolicyConfig, ResolvedConfig};
pub use error::{ConfigError, FetchError};
pub use github::{GitHubClient, DEFAULT_API_URL};
pub use report::{GateReport, ReportStatus, ReportSummary};
pub use settings::{CsvList, Settings, DEFAULT_CHECKLIST_TITLE};
pub use source::{PullRequestData, PullRequestRef, PullRequestSource, StaticSource};
pub use step::{CheckStep, Control, StepId, StepStatus};
