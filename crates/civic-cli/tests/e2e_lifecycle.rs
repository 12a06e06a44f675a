//! E2E CLI lifecycle tests: report -> upvote -> acknowledge -> assign -> resolve.
//!
//! Each test runs the `civic` binary as a subprocess against an isolated data
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the civic binary with its data under `dir`.
fn civic_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("civic"));
    cmd.current_dir(dir);
    cmd.env("CIVIC_DIR", dir.join("data"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env_remove("CIVIC_USER");
    cmd.env_remove("FORMAT");
    // Keep stderr free of log lines so error JSON parses.
    cmd.env("CIVIC_LOG", "error");
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = civic_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("civic should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

fn run_error_json(dir: &Path, args: &[&str]) -> Value {
    let output = civic_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("civic should not crash");
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    // Warnings precede the error object; anyhow's `Error:` line trails it.
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_part = stderr
        .split_once("\nError:")
        .map_or(stderr.as_ref(), |(json, _)| json);
    serde_json::Deserializer::from_str(json_part)
        .into_iter::<Value>()
        .map_while(Result::ok)
        .find(|v| v.get("error").is_some())
        .expect("stderr should carry an error object")
}

fn report(dir: &Path, title: &str) -> String {
    let json = run_json(
        dir,
        &[
            "report",
            "--title",
            title,
            "--description",
            "Needs attention soon",
            "--category",
            "road-maintenance",
            "--lat",
            "23.02",
            "--lng",
            "72.57",
        ],
    );
    json["issue"]["id"]
        .as_str()
        .expect("report output should have issue.id")
        .to_string()
}

// ===========================================================================
// Report
// ===========================================================================

#[test]
fn first_run_seeds_three_issues() {
    let dir = TempDir::new().unwrap();
    let home = run_json(dir.path(), &["home"]);
    assert_eq!(home["stats"]["total"], 3);
    assert_eq!(home["stats"]["resolved"], 1);
    assert_eq!(home["recent"].as_array().unwrap().len(), 3);
    assert!(dir.path().join("data/issues.json").exists());
}

#[test]
fn report_prepends_new_issue() {
    let dir = TempDir::new().unwrap();
    let id = report(dir.path(), "Broken pavement");

    let home = run_json(dir.path(), &["home"]);
    assert_eq!(home["stats"]["total"], 4);
    assert_eq!(home["recent"][0]["id"], id);
    assert_eq!(home["recent"][0]["status"], "submitted");
    assert_eq!(home["recent"][0]["upvotes"], 0);
    assert_eq!(home["recent"][0]["reporterId"], "user1");
}

#[test]
fn report_json_carries_notices() {
    let dir = TempDir::new().unwrap();
    let json = run_json(
        dir.path(),
        &[
            "report",
            "--title",
            "Dark lane",
            "--description",
            "Lamp out",
            "--category",
            "Street Lighting",
            "--lat",
            "23.0",
            "--lng",
            "72.5",
            "--anonymous",
        ],
    );
    assert_eq!(json["issue"]["isAnonymous"], true);
    assert!(json["issue"].get("reporterId").is_none());
    assert_eq!(
        json["issue"]["location"]["address"],
        "23.0000, 72.5000 - Ahmedabad, Gujarat"
    );
    let notices = json["notices"].as_array().unwrap();
    assert_eq!(notices[0]["message"], "Issue reported successfully!");
    assert_eq!(notices[1]["delay_ms"], 2000);
}

#[test]
fn report_without_location_is_rejected() {
    let dir = TempDir::new().unwrap();
    let err = run_error_json(
        dir.path(),
        &["report", "--title", "x", "--description", "y", "--category", "drainage"],
    );
    assert_eq!(err["error"]["error_code"], "E2001");
    assert!(
        err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("location")
    );

    let home = run_json(dir.path(), &["home"]);
    assert_eq!(home["stats"]["total"], 3);
}

#[test]
fn report_uses_configured_location_and_priority() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(
        dir.path().join("data/config.toml"),
        "[location]\nlat = 23.05\nlng = 72.6\naddress = \"Ward 9\"\n\n[report]\ndefault_priority = \"high\"\n",
    )
    .unwrap();

    let json = run_json(
        dir.path(),
        &[
            "report",
            "--title",
            "Overflowing bin",
            "--description",
            "Smells",
            "--category",
            "waste-management",
        ],
    );
    assert_eq!(json["issue"]["location"]["address"], "Ward 9");
    assert_eq!(json["issue"]["priority"], "high");
}

#[test]
fn dictated_transcript_is_appended() {
    let dir = TempDir::new().unwrap();
    let transcript = dir.path().join("speech.txt");
    std::fs::write(&transcript, "water everywhere\n").unwrap();
    let json = run_json(
        dir.path(),
        &[
            "report",
            "--title",
            "Burst main",
            "--description",
            "Pipe burst",
            "--category",
            "water-leaks",
            "--lat",
            "23.0",
            "--lng",
            "72.5",
            "--dictate",
            transcript.to_str().unwrap(),
        ],
    );
    assert_eq!(json["issue"]["description"], "Pipe burst water everywhere");
}

#[test]
fn missing_transcript_warns_but_reports() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .args([
            "report",
            "--title",
            "Burst main",
            "--description",
            "Pipe burst",
            "--category",
            "water-leaks",
            "--lat",
            "23.0",
            "--lng",
            "72.5",
            "--dictate",
            "missing.txt",
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: speech recognition failed"));
}

// ===========================================================================
// Upvote
// ===========================================================================

#[test]
fn upvote_once_per_user() {
    let dir = TempDir::new().unwrap();
    let first = run_json(dir.path(), &["upvote", "2"]);
    assert_eq!(first["issue"]["upvotes"], 9);

    let err = run_error_json(dir.path(), &["upvote", "2"]);
    assert_eq!(err["error"]["error_code"], "E2004");

    let other = run_json(dir.path(), &["--as", "user2", "upvote", "2"]);
    assert_eq!(other["issue"]["upvotes"], 10);

    let show = run_json(dir.path(), &["show", "2"]);
    assert_eq!(show["upvotes"], 10);
    assert_eq!(show["has_upvoted"], true);
}

#[test]
fn upvote_unknown_issue_fails() {
    let dir = TempDir::new().unwrap();
    let err = run_error_json(dir.path(), &["upvote", "nope"]);
    assert_eq!(err["error"]["error_code"], "E2002");
}

// ===========================================================================
// Status lifecycle
// ===========================================================================

#[test]
fn citizen_cannot_change_status() {
    let dir = TempDir::new().unwrap();
    let id = report(dir.path(), "Pothole");
    let err = run_error_json(dir.path(), &["advance", &id]);
    assert_eq!(err["error"]["error_code"], "E2005");
}

#[test]
fn staff_walks_issue_to_resolved() {
    let dir = TempDir::new().unwrap();
    let id = report(dir.path(), "Pothole");
    civic_cmd(dir.path()).args(["login", "user2"]).assert().success();

    let ack = run_json(dir.path(), &["advance", &id]);
    assert_eq!(ack["issue"]["status"], "acknowledged");
    assert_eq!(
        ack["issue"]["publicComments"][0]["text"],
        "Status changed to acknowledged by municipal staff."
    );
    assert_eq!(ack["issue"]["publicComments"][0]["author"], "Priya Patel");

    let assigned = run_json(dir.path(), &["status", &id, "assigned"]);
    assert_eq!(assigned["issue"]["status"], "assigned");

    let resolved = run_json(dir.path(), &["advance", &id]);
    assert_eq!(resolved["issue"]["status"], "resolved");
    assert_eq!(resolved["issue"]["publicComments"].as_array().unwrap().len(), 3);
    let notices = resolved["notices"].as_array().unwrap();
    assert_eq!(notices[1]["delay_ms"], 1000);

    let err = run_error_json(dir.path(), &["advance", &id]);
    assert_eq!(err["error"]["error_code"], "E2003");
}

#[test]
fn skipping_a_stage_is_rejected() {
    let dir = TempDir::new().unwrap();
    let id = report(dir.path(), "Pothole");
    let err = run_error_json(dir.path(), &["--as", "admin1", "status", &id, "resolved"]);
    assert_eq!(err["error"]["error_code"], "E2003");

    let show = run_json(dir.path(), &["show", &id]);
    assert_eq!(show["status"], "submitted");
    assert!(show["publicComments"].as_array().unwrap().is_empty());
}

#[test]
fn text_mode_prints_notices() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .args(["--as", "user2", "--format", "text", "advance", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3\tassigned"))
        .stdout(predicate::str::contains("Issue status updated to assigned!"));
}

#[test]
fn quiet_suppresses_notices() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .args(["--as", "user2", "--format", "text", "-q", "advance", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issue status updated").not());
}
