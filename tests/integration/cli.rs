//! Integration tests for the gridstatus binary

use assert_cmd::Command;

fn gridstatus() -> Command {
    let mut cmd = Command::cargo_bin("gridstatus").unwrap();
    cmd.env_remove("GRIDSTATUS_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let output = gridstatus().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("query"));
    assert!(stdout.contains("datasets"));
    assert!(stdout.contains("daily-peak"));
}

#[test]
fn test_missing_api_key_exits_with_error() {
    let output = gridstatus().arg("datasets").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GRIDSTATUS_API_KEY"), "stderr: {stderr}");
}

#[test]
fn test_conflicting_timezones_fail_before_any_request() {
    let output = gridstatus()
        .args([
            "--api-key",
            "k",
            "--host",
            "http://127.0.0.1:9",
            "query",
            "ercot_load",
            "--tz",
            "America/Chicago",
            "--timezone",
            "America/Chicago",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot both be set"), "stderr: {stderr}");
}

#[test]
fn test_invalid_format_is_usage_error() {
    let output = gridstatus()
        .args(["--format", "xml", "datasets"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(1));
}
