//! Integration tests for the `fleetdeck` CLI binary.
//!
//! These tests validate argument parsing, help output, and error handling —
//! all without requiring a live backend (the protocol itself is covered by
//! wiremock tests in `fleetdeck-core`).
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fleetdeck` binary with env isolation.
///
/// Clears all `FLEETDECK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn fleetdeck_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fleetdeck");
    cmd.env("HOME", "/tmp/fleetdeck-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fleetdeck-cli-test-nonexistent")
        .env_remove("FLEETDECK_PROFILE")
        .env_remove("FLEETDECK_BACKEND")
        .env_remove("FLEETDECK_OUTPUT")
        .env_remove("FLEETDECK_INSECURE")
        .env_remove("FLEETDECK_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fleetdeck_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    fleetdeck_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("machine fleet")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("power"))
            .and(predicate::str::contains("connect")),
    );
}

#[test]
fn test_version_flag() {
    fleetdeck_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetdeck"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_power_requires_operation_and_machine() {
    let output = fleetdeck_cmd().arg("power").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_power_rejects_unknown_operation() {
    let output = fleetdeck_cmd()
        .args(["power", "suspend", "nas"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("suspend"), "unexpected output:\n{text}");
}

#[test]
fn test_add_requires_name_and_mac() {
    let output = fleetdeck_cmd().arg("add").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("--name"), "unexpected output:\n{text}");
}

// ── Configuration resolution ────────────────────────────────────────

#[test]
fn test_list_without_backend_fails_with_help() {
    let output = fleetdeck_cmd().arg("list").output().unwrap();
    assert_ne!(output.status.code(), Some(0));
    let text = combined_output(&output);
    assert!(
        text.contains("FLEETDECK_BACKEND") || text.contains("--backend"),
        "expected config guidance in output:\n{text}"
    );
}

#[test]
fn test_invalid_backend_url_is_rejected() {
    let output = fleetdeck_cmd()
        .args(["--backend", "not a url", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[test]
fn test_unknown_profile_is_rejected() {
    let output = fleetdeck_cmd()
        .args(["--profile", "nope", "list"])
        .output()
        .unwrap();
    assert_ne!(output.status.code(), Some(0));
    let text = combined_output(&output);
    assert!(text.contains("nope"), "unexpected output:\n{text}");
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_prints_a_path() {
    fleetdeck_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_defaults_to_toml() {
    fleetdeck_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

#[test]
fn test_config_init_rejects_invalid_url() {
    let output = fleetdeck_cmd()
        .args(["config", "init", "--backend", "not a url"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

// ── Connection failures ─────────────────────────────────────────────

#[test]
fn test_list_against_unreachable_backend() {
    // Port 9 (discard) is about as unreachable as it gets.
    let output = fleetdeck_cmd()
        .args(["--backend", "http://127.0.0.1:9", "--timeout", "2", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
