//! Binary-level tests for the fx CLI

use assert_cmd::Command;
use predicates::prelude::*;

fn fx() -> Command {
    Command::cargo_bin("fx").expect("binary builds")
}

#[test]
fn test_help_lists_commands() {
    fx().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("tools"));
}

#[test]
fn test_tools_lists_the_tool_set() {
    fx().arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("web_search"))
        .stdout(predicate::str::contains("read_file"))
        .stdout(predicate::str::contains("navigate"))
        .stdout(predicate::str::contains("run_python"))
        .stdout(predicate::str::contains("send_push_notification"));
}

#[test]
fn test_run_without_api_key_fails_fast() {
    fx().args(["run", "summarize the news"])
        .env_remove("ANTHROPIC_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    fx().args(["--config", "/nonexistent/factotum.yml", "tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_config_file_is_honored() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("factotum.yml");
    std::fs::write(
        &config_path,
        "llm:\n  api-key-env: FX_TEST_MISSING_KEY\n",
    )
    .unwrap();

    fx().args(["--config", config_path.to_str().unwrap(), "run", "hello"])
        .env_remove("FX_TEST_MISSING_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FX_TEST_MISSING_KEY"));
}
