//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "tickdown-cli", "--quiet", "--"])
        .args(args)
        .env("TICKDOWN_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn timer_status_reports_state() {
    let (stdout, _stderr, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "timer status failed");

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("status output is not JSON");
    assert_eq!(parsed["type"], "StateSnapshot");
}

#[test]
fn timer_stop_is_safe_when_idle() {
    let (stdout, _stderr, code) = run_cli(&["timer", "stop"]);
    assert_eq!(code, 0, "timer stop failed");
    assert!(stdout.contains("TimerStopped"));
}

#[test]
fn timer_start_then_stop_round_trip() {
    let (stdout, _stderr, code) = run_cli(&["timer", "start", "90"]);
    assert_eq!(code, 0, "timer start failed");

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("start output is not JSON");
    assert_eq!(parsed["type"], "TimerStarted");
    assert_eq!(parsed["requested_minutes"], 90);

    let (stdout, _stderr, code) = run_cli(&["timer", "stop"]);
    assert_eq!(code, 0, "timer stop failed");
    assert!(stdout.contains("TimerStopped"));
}

#[test]
fn timer_start_rejects_zero() {
    let (_stdout, stderr, code) = run_cli(&["timer", "start", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("positive"));
}

#[test]
fn timer_say_rejects_garbage() {
    let (_stdout, stderr, code) = run_cli(&["timer", "say", "whenever"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("can't process"));
}

#[test]
fn config_show_prints_toml() {
    let (stdout, _stderr, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("default_minutes"));
    assert!(stdout.contains("wakeup_retry_cap"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let (_stdout, stderr, code) = run_cli(&["config", "set", "volume", "11"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn completions_generate() {
    let (stdout, _stderr, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0, "completions failed");
    assert!(stdout.contains("tickdown-cli"));
}
