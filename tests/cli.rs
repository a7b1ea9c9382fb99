use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn lhmon() -> Command {
    Command::cargo_bin("lhmon").unwrap()
}

#[test]
fn test_help_lists_commands() {
    lhmon()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn test_report_help_lists_filters() {
    lhmon()
        .args(["report", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--disk-tag"))
        .stdout(predicate::str::contains("--no-relationships"))
        .stdout(predicate::str::contains("--kubeconfig"));
}

#[test]
fn test_invalid_format_rejected() {
    lhmon()
        .args(["report", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    lhmon()
        .arg("--config")
        .arg(&missing)
        .arg("report")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_malformed_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[output\ncolor = ").unwrap();
    lhmon()
        .arg("--config")
        .arg(&path)
        .arg("cleanup")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse configuration"));
}

#[test]
fn test_version() {
    lhmon()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
