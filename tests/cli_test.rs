//! Integration tests for the `vhostcrab` and `check-dns` binaries.
//!
//! These cover argument parsing, `list`, `version` and error exits. Nothing here needs Apache,
//! Certbot, root or network access; every path points into a temporary directory.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Write a config pointing every path into `dir` and return its location.
fn write_config(dir: &TempDir) -> PathBuf {
    let config = serde_json::json!({
        "sites_available": dir.path().join("sites-available"),
        "state_path": dir.path().join("vhost_manager.json"),
        "certbot_email_path": dir.path().join(".email"),
        "log_dir": dir.path().join("log"),
    });
    let path = dir.path().join("config.json");
    std::fs::write(&path, config.to_string()).unwrap();
    path
}

fn vhostcrab_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vhostcrab");
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── vhostcrab ───────────────────────────────────────────────────────

#[test]
fn test_no_args_shows_usage() {
    let output = cargo_bin_cmd!("vhostcrab").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    cargo_bin_cmd!("vhostcrab")
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("create")
                .and(predicate::str::contains("delete"))
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("renew-ssl"))
                .and(predicate::str::contains("version")),
        );
}

#[test]
fn test_unknown_command_fails() {
    cargo_bin_cmd!("vhostcrab")
        .arg("frobnicate")
        .assert()
        .failure();
}

#[test]
fn test_version_command() {
    let dir = tempfile::tempdir().unwrap();
    vhostcrab_cmd(&write_config(&dir))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("v", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    vhostcrab_cmd(&write_config(&dir))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sites configured"));
}

#[test]
fn test_list_shows_sites() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    std::fs::write(
        dir.path().join("vhost_manager.json"),
        r#"{
          "example.com": {"port": 8080, "ssl": true, "created": "2024-03-01T09:15:00Z",
                          "config_file": "/etc/apache2/sites-available/example.com.conf"},
          "api.test.com": {"port": 3000, "ssl": false, "created": "2023-11-20T14:03:07.512311",
                           "config_file": "/etc/apache2/sites-available/api.test.com.conf"}
        }"#,
    )
    .unwrap();

    vhostcrab_cmd(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("example.com")
                .and(predicate::str::contains("HTTPS"))
                .and(predicate::str::contains("8080"))
                .and(predicate::str::contains("2024-03-01 09:15"))
                .and(predicate::str::contains("api.test.com"))
                .and(predicate::str::contains("2023-11-20 14:03")),
        );
}

#[test]
fn test_list_corrupt_state_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    std::fs::write(dir.path().join("vhost_manager.json"), "{ nope").unwrap();

    vhostcrab_cmd(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sites configured"));
}

#[test]
fn test_list_logs_to_file() {
    let dir = tempfile::tempdir().unwrap();
    vhostcrab_cmd(&write_config(&dir))
        .arg("list")
        .assert()
        .success();

    let log = std::fs::read_to_string(dir.path().join("log").join("manager.log")).unwrap();
    assert!(log.contains("starting fresh"), "log was:\n{log}");
}

#[test]
fn test_bad_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    vhostcrab_cmd(&path)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn test_create_rejected_without_changes() {
    // Refused for lack of root, or (when the suite runs as root) for the invalid domain.
    let dir = tempfile::tempdir().unwrap();
    vhostcrab_cmd(&write_config(&dir))
        .args(["create", "bad_domain!.com", "3000", "--no-ssl"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("root privileges")
                .or(predicate::str::contains("invalid domain name")),
        );
    assert!(!dir.path().join("sites-available").exists());
    assert!(!dir.path().join("vhost_manager.json").exists());
}

#[test]
fn test_delete_unknown_site_fails() {
    let dir = tempfile::tempdir().unwrap();
    vhostcrab_cmd(&write_config(&dir))
        .args(["delete", "missing.com"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("root privileges")
                .or(predicate::str::contains("does not exist")),
        );
}

// ── check-dns ───────────────────────────────────────────────────────

#[test]
fn test_check_dns_requires_domain() {
    let output = cargo_bin_cmd!("check-dns").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_check_dns_help() {
    cargo_bin_cmd!("check-dns")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("www."));
}

#[test]
fn test_check_dns_invalid_domain() {
    cargo_bin_cmd!("check-dns")
        .arg("not_a_domain!")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid domain name"));
}

#[test]
fn test_check_dns_unreachable_ip_service() {
    cargo_bin_cmd!("check-dns")
        .args([
            "example.com",
            "--ip-service",
            "http://127.0.0.1:9/",
            "--timeout",
            "2",
        ])
        .assert()
        .code(1);
}
