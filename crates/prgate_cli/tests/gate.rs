use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GATE_ENV: &[&str] = &[
    "PLUGIN_CONFIG",
    "PLUGIN_REPORT",
    "PLUGIN_PREFIXES",
    "PLUGIN_REGEXP",
    "PLUGIN_SKIP_ON_LABELS",
    "PLUGIN_IGNORE_GITHUB_ERROR",
    "PLUGIN_CHECKLIST",
    "PLUGIN_CHECKLIST_TITLE",
    "DRONE_PULL_REQUEST_TITLE",
    "DRONE_REPO_OWNER",
    "DRONE_REPO_NAME",
    "DRONE_PULL_REQUEST",
    "GITHUB_TOKEN",
    "GITHUB_API_URL",
    "RUST_LOG",
];

/// Nothing listens here; runs that never fetch never notice.
const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// The binary as Drone would start it: no arguments, everything from env.
fn prgate(api_url: &str, title: &str) -> Command {
    let mut cmd = Command::cargo_bin("prgate").unwrap();
    for var in GATE_ENV {
        cmd.env_remove(var);
    }
    cmd.env("DRONE_PULL_REQUEST_TITLE", title)
        .env("DRONE_REPO_OWNER", "octo")
        .env("DRONE_REPO_NAME", "gate")
        .env("DRONE_PULL_REQUEST", "5")
        .env("GITHUB_TOKEN", "secret-token")
        .env("GITHUB_API_URL", api_url);
    cmd
}

#[test]
fn skip_label_exits_zero_and_stops_output() {
    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(MockServer::start());
    runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/repos/octo/gate/pulls/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "labels": [{"name": "skip-gate"}],
                "body": null,
            })))
            .mount(&server),
    );

    prgate(&server.uri(), "chore: tidy")
        .env("PLUGIN_SKIP_ON_LABELS", "skip-gate")
        .env("PLUGIN_PREFIXES", "feat:")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "🦘 step=labels message=skip label (skip-gate) detected, skipping remaining checks",
        ))
        .stdout(predicate::str::contains("step=prefix").not());
}

#[test]
fn policy_violation_exits_one_with_error_summary() {
    prgate(UNREACHABLE_API, "chore: tidy")
        .env("PLUGIN_PREFIXES", "feat:,fix:")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "❌ step=prefix message=pr title does not have any required prefix (feat:,fix:)",
        ))
        .stderr(predicate::str::contains("Found 1 errors"));
}

#[test]
fn invalid_regexp_fails_before_any_step() {
    prgate(UNREACHABLE_API, "feat: add gate")
        .env("PLUGIN_REGEXP", "(")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid gate configuration"));
}

#[test]
fn empty_boolean_env_uses_defaults() {
    prgate(UNREACHABLE_API, "feat: add gate")
        .env("PLUGIN_PREFIXES", "feat:")
        .env("PLUGIN_CHECKLIST", "")
        .env("PLUGIN_IGNORE_GITHUB_ERROR", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ step=prefix message=prefixes check passed"))
        .stdout(predicate::str::contains(
            "🦘 step=checklist message=checklist checks disabled",
        ));
}

#[test]
fn missing_token_is_a_configuration_error() {
    prgate(UNREACHABLE_API, "feat: add gate")
        .env_remove("GITHUB_TOKEN")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}
