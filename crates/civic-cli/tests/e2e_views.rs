//! E2E CLI tests for read-only views, sessions and output modes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn civic_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("civic"));
    cmd.current_dir(dir);
    cmd.env("CIVIC_DIR", dir.join("data"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env_remove("CIVIC_USER");
    cmd.env_remove("FORMAT");
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

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect()
}

// ===========================================================================
// Dashboard
// ===========================================================================

#[test]
fn dashboard_filters_combine() {
    let dir = TempDir::new().unwrap();
    let all = run_json(dir.path(), &["dashboard"]);
    assert_eq!(ids(&all["issues"]), ["1", "2", "3"]);
    assert_eq!(all["stats"]["by_status"]["submitted"], 0);

    let high = run_json(dir.path(), &["dashboard", "--priority", "high"]);
    assert_eq!(ids(&high["issues"]), ["1", "3"]);
    assert_eq!(high["stats"]["total"], 2);

    let search = run_json(dir.path(), &["dashboard", "--search", "STREET"]);
    assert_eq!(ids(&search["issues"]), ["1", "2"]);

    let none = run_json(
        dir.path(),
        &["dashboard", "--category", "street-lighting", "--status", "submitted"],
    );
    assert!(none["issues"].as_array().unwrap().is_empty());
}

#[test]
fn citizen_mine_tab_lists_own_reports() {
    let dir = TempDir::new().unwrap();
    let mine = run_json(dir.path(), &["dashboard", "--scope", "mine"]);
    assert_eq!(ids(&mine["issues"]), ["1"]);
    assert_eq!(mine["tabs"], serde_json::json!(["all", "mine"]));
}

#[test]
fn staff_cannot_use_mine_tab() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .args(["--as", "user2", "dashboard", "--scope", "mine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));

    let municipal = run_json(dir.path(), &["--as", "user2", "dashboard", "--scope", "municipal"]);
    assert_eq!(municipal["issues"].as_array().unwrap().len(), 3);
}

// ===========================================================================
// Map
// ===========================================================================

#[test]
fn map_projects_markers_with_status_colors() {
    let dir = TempDir::new().unwrap();
    let map = run_json(dir.path(), &["map"]);
    let markers = map["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 3);
    assert_eq!(markers[0]["issue_id"], "1");
    assert_eq!(markers[0]["color"], "#8b5cf6");
    assert_eq!(markers[1]["color"], "#10b981");
    assert_eq!(markers[2]["color"], "#3b82f6");
    assert_eq!(markers[0]["popup"]["title"], "Pothole on Main Street");
    assert!(
        markers[0]["popup"]["first_photo"]
            .as_str()
            .unwrap()
            .starts_with("https://images.pexels.com/")
    );

    let resolved = run_json(dir.path(), &["map", "--status", "resolved"]);
    assert_eq!(resolved["markers"].as_array().unwrap().len(), 1);
    assert_eq!(ids(&resolved["listed"]), ["2"]);
}

#[test]
fn map_lists_at_most_five() {
    let dir = TempDir::new().unwrap();
    for n in 0..4 {
        let title = format!("Leak {n}");
        civic_cmd(dir.path())
            .args([
                "report",
                "--title",
                &title,
                "--description",
                "Dripping",
                "--category",
                "water-leaks",
                "--lat",
                "23.0",
                "--lng",
                "72.5",
            ])
            .assert()
            .success();
    }
    let map = run_json(dir.path(), &["map"]);
    assert_eq!(map["markers"].as_array().unwrap().len(), 7);
    assert_eq!(map["listed"].as_array().unwrap().len(), 5);
}

// ===========================================================================
// Analytics
// ===========================================================================

#[test]
fn analytics_is_admin_only() {
    let dir = TempDir::new().unwrap();
    let output = civic_cmd(dir.path())
        .args(["analytics", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("E2005"));

    let report = run_json(dir.path(), &["--as", "admin1", "analytics"]);
    assert_eq!(report["departments"].as_array().unwrap().len(), 4);
    assert_eq!(report["departments"][0]["rating"], "Good");
    assert_eq!(report["avg_response_days"], 3.2);
    assert_eq!(ids(&report["urgent"]), ["1", "3"]);
    assert_eq!(report["assigned_by_department"]["sanitation"], 1);
}

// ===========================================================================
// Session and language
// ===========================================================================

#[test]
fn role_switch_keeps_identity_and_persists() {
    let dir = TempDir::new().unwrap();
    let before = run_json(dir.path(), &["whoami"]);
    assert_eq!(before["user"]["role"], "citizen");

    let switched = run_json(dir.path(), &["role", "admin"]);
    assert_eq!(switched["id"], before["user"]["id"]);
    assert_eq!(switched["role"], "admin");

    let after = run_json(dir.path(), &["whoami"]);
    assert_eq!(after["user"]["role"], "admin");
    assert_eq!(after["role_label"], "Administrator");
    assert_eq!(after["can_view_analytics"], true);
}

#[test]
fn login_switches_to_directory_user() {
    let dir = TempDir::new().unwrap();
    let user = run_json(dir.path(), &["login", "user2"]);
    assert_eq!(user["name"], "Priya Patel");
    assert_eq!(user["department"], "electricity");

    civic_cmd(dir.path())
        .args(["login", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown user 'ghost'"));
}

#[test]
fn unknown_user_reports_user_not_found() {
    let dir = TempDir::new().unwrap();
    for args in [
        vec!["login", "ghost", "--json"],
        vec!["--as", "ghost", "whoami", "--json"],
    ] {
        let output = civic_cmd(dir.path()).args(&args).output().unwrap();
        assert!(!output.status.success(), "{args:?} should fail");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("\"error_code\": \"E2007\""), "{stderr}");
    }
}

#[test]
fn civic_user_env_overrides_for_one_command() {
    let dir = TempDir::new().unwrap();
    let output = civic_cmd(dir.path())
        .env("CIVIC_USER", "admin1")
        .args(["whoami", "--json"])
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["user"]["id"], "admin1");

    let stored = run_json(dir.path(), &["whoami"]);
    assert_eq!(stored["user"]["role"], "citizen");
}

#[test]
fn language_persists() {
    let dir = TempDir::new().unwrap();
    let current = run_json(dir.path(), &["lang"]);
    assert_eq!(current["language"], "en");

    let set = run_json(dir.path(), &["lang", "hi"]);
    assert_eq!(set["speech_locale"], "hi-IN");
    let again = run_json(dir.path(), &["lang"]);
    assert_eq!(again["language"], "hi");
}

// ===========================================================================
// Output modes
// ===========================================================================

#[test]
fn invalid_enum_value_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    let output = civic_cmd(dir.path())
        .args(["--json", "dashboard", "--category", "potholes"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let err: Value = serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    assert_eq!(err["error"]["error_code"], "E2006");
    assert!(
        err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("potholes")
    );
}

#[test]
fn invalid_enum_value_in_text_mode_uses_clap_usage() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .args(["dashboard", "--status", "closed"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'closed'"));
}

#[test]
fn format_env_selects_text() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .env("FORMAT", "text")
        .args(["dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id\tstatus\tpriority"));
}

#[test]
fn user_config_output_applies_when_piped() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config/civic");
    std::fs::create_dir_all(&config).unwrap();
    std::fs::write(config.join("config.toml"), "output = \"json\"\n").unwrap();

    let output = civic_cmd(dir.path()).args(["home"]).output().unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("user config selects json");
    assert_eq!(json["stats"]["total"], 3);
}

#[test]
fn pretty_show_renders_sections() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .args(["--format", "pretty", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issue 1"))
        .stdout(predicate::str::contains("Pothole on Main Street"))
        .stdout(predicate::str::contains("Updates (1)"));
}

#[test]
fn completions_generate_script() {
    let dir = TempDir::new().unwrap();
    civic_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("civic"));
}
