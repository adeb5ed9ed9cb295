use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use prgate_core::{
    GateConfig, GateReport, GitHubClient, GitHubConfig, PolicyConfig, PullRequestChecker,
    ReportStatus,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "prgate",
    version,
    about = "Gate pull requests on title, label and checklist policy"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    check: CheckArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gate checks against a pull request. This is the default.
    Check(CheckArgs),
    /// Pretty-print a report written by `check --report`.
    Report(ReportArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// TOML file with `[policy]` and `[github]` tables. Flags and env win over it.
    #[arg(long, env = "PLUGIN_CONFIG")]
    config: Option<PathBuf>,
    /// Also write the run report as JSON to this path.
    #[arg(long, env = "PLUGIN_REPORT")]
    report: Option<PathBuf>,
    #[arg(long)]
    id: Option<String>,
    #[command(flatten)]
    policy: PolicyArgs,
    #[command(flatten)]
    github: GitHubArgs,
}

#[derive(Args)]
struct PolicyArgs {
    /// Comma-separated title prefixes, any one of which must match.
    #[arg(long, env = "PLUGIN_PREFIXES")]
    prefixes: Option<String>,
    /// Pattern the title must match.
    #[arg(long, env = "PLUGIN_REGEXP")]
    regexp: Option<String>,
    /// Comma-separated labels that skip every remaining check.
    #[arg(long, env = "PLUGIN_SKIP_ON_LABELS")]
    skip_on_labels: Option<String>,
    /// Downgrade GitHub failures to skipped checks (default true).
    #[arg(long, env = "PLUGIN_IGNORE_GITHUB_ERROR", value_parser = parse_env_bool)]
    ignore_github_error: Option<EnvBool>,
    /// Require the description checklist to be completed (default false).
    #[arg(long, env = "PLUGIN_CHECKLIST", value_parser = parse_env_bool)]
    checklist: Option<EnvBool>,
    /// Heading that introduces the checklist.
    #[arg(long, env = "PLUGIN_CHECKLIST_TITLE")]
    checklist_title: Option<String>,
    #[arg(long, env = "DRONE_PULL_REQUEST_TITLE")]
    title: Option<String>,
}

/// A boolean flag where an empty value (`PLUGIN_CHECKLIST=`) means unset.
#[derive(Debug, Clone, Copy)]
struct EnvBool(Option<bool>);

fn parse_env_bool(value: &str) -> Result<EnvBool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(EnvBool(None)),
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(EnvBool(Some(true))),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(EnvBool(Some(false))),
        other => Err(format!("expected a boolean, got `{other}`")),
    }
}

#[derive(Args)]
struct GitHubArgs {
    #[arg(long, env = "DRONE_REPO_OWNER")]
    owner: Option<String>,
    #[arg(long, env = "DRONE_REPO_NAME")]
    repo: Option<String>,
    #[arg(long, env = "DRONE_PULL_REQUEST")]
    pull_request: Option<u64>,
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// REST API root, for GitHub Enterprise.
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    input: PathBuf,
}

impl From<PolicyArgs> for PolicyConfig {
    fn from(args: PolicyArgs) -> Self {
        Self {
            prefixes: args.prefixes,
            regexp: args.regexp,
            skip_on_labels: args.skip_on_labels,
            ignore_github_error: args.ignore_github_error.and_then(|b| b.0),
            checklist: args.checklist.and_then(|b| b.0),
            checklist_title: args.checklist_title,
            title: args.title,
        }
    }
}

impl From<GitHubArgs> for GitHubConfig {
    fn from(args: GitHubArgs) -> Self {
        Self {
            owner: args.owner,
            repo: args.repo,
            pull_request: args.pull_request,
            token: args.token,
            api_url: args.api_url,
        }
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Check(args)) => handle_check(args),
        Some(Commands::Report(args)) => handle_report(args),
        None => handle_check(cli.check),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn handle_check(args: CheckArgs) -> Result<ExitCode> {
    let CheckArgs {
        config,
        report: report_path,
        id,
        policy,
        github,
    } = args;

    let overrides = GateConfig {
        policy: policy.into(),
        github: github.into(),
    };
    let config = match config {
        Some(path) => GateConfig::from_path(&path)?.merge(overrides),
        None => overrides,
    };
    let resolved = config.resolve().context("invalid gate configuration")?;

    let client = GitHubClient::new(&resolved.github).context("failed to set up github client")?;
    let pull_request = resolved.pull_request.clone();
    let checker = PullRequestChecker::new(resolved.settings, pull_request.clone(), client)?;

    let run_id = id.unwrap_or_else(|| format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S")));
    info!(target: "prgate.cli", %run_id, %pull_request, "running gate checks");
    let report = GateReport::new(run_id, pull_request, checker.run());

    let mut stdout = io::stdout().lock();
    report.render(&mut stdout)?;
    stdout.flush()?;

    if let Some(path) = report_path {
        write_report(&path, &report)?;
    }

    Ok(ExitCode::from(exit_code(&report)))
}

fn exit_code(report: &GateReport) -> u8 {
    match report.summary.status {
        ReportStatus::Pass => 0,
        ReportStatus::OptedOut => {
            info!(target: "prgate.cli", "pull request opted out of the gate");
            0
        }
        ReportStatus::Fail => {
            eprintln!("Found {} errors", report.summary.errors);
            1
        }
    }
}

fn write_report(path: &Path, report: &GateReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    info!(target: "prgate.cli", path = %path.display(), "report written");
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<ExitCode> {
    let data = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let report: GateReport = serde_json::from_str(&data)?;
    println!(
        "Report {} for {} -> {:?} ({} errors)",
        report.id, report.pull_request, report.summary.status, report.summary.errors
    );
    report.render(&mut io::stdout().lock())?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use prgate_core::{CheckStep, PullRequestRef, RunOutcome, StepId};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_policy_config() {
        let cli = Cli::try_parse_from([
            "prgate",
            "check",
            "--prefixes",
            "feat:,fix:",
            "--checklist",
            "yes",
            "--ignore-github-error",
            "false",
            "--pull-request",
            "9",
        ])
        .unwrap();
        let Some(Commands::Check(args)) = cli.command else {
            panic!("expected the check subcommand");
        };
        let policy = PolicyConfig::from(args.policy);
        assert_eq!(policy.prefixes.as_deref(), Some("feat:,fix:"));
        assert_eq!(policy.checklist, Some(true));
        assert_eq!(policy.ignore_github_error, Some(false));
        assert_eq!(GitHubConfig::from(args.github).pull_request, Some(9));
    }

    #[test]
    fn empty_boolean_means_unset() {
        let cli =
            Cli::try_parse_from(["prgate", "--checklist", "", "--ignore-github-error", " "]).unwrap();
        let policy = PolicyConfig::from(cli.check.policy);
        assert_eq!(policy.checklist, None);
        assert_eq!(policy.ignore_github_error, None);
        assert!(policy.ignore_github_error_enabled());
        assert!(!policy.checklist_enabled());

        assert!(Cli::try_parse_from(["prgate", "--checklist", "maybe"]).is_err());
    }

    #[test]
    fn report_subcommand_parses() {
        let cli = Cli::try_parse_from(["prgate", "report", "--input", "gate.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Report(ref r)) if r.input == Path::new("gate.json")));
    }

    fn report(steps: Vec<CheckStep>, errors: usize, stopped_early: bool) -> GateReport {
        GateReport::new(
            "run-test",
            PullRequestRef::new("octo", "gate", 1),
            RunOutcome {
                steps,
                errors,
                stopped_early,
            },
        )
    }

    #[test]
    fn failing_report_maps_to_failure_exit() {
        let failed = report(vec![CheckStep::error(StepId::Prefix, "bad")], 1, false);
        assert_eq!(exit_code(&failed), 1);

        let opted = report(vec![CheckStep::opt_out(StepId::Labels, "skip")], 0, true);
        assert_eq!(exit_code(&opted), 0);
    }
}
