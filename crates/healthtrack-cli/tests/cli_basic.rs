//! CLI end-to-end tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_healthtrack"))
        .args(args)
        .env("HEALTHTRACK_DATA_DIR", data_dir)
        .env_remove("HEALTHTRACK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let stdout = run_ok(data_dir, args);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("{args:?} printed invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_profile_defaults_and_set() {
    let dir = tempfile::tempdir().unwrap();
    let shown = run_json(dir.path(), &["profile", "show", "--json"]);
    assert_eq!(shown["profile"]["height"], 170.0);
    assert_eq!(shown["bmi_category"], "normal");

    run_ok(dir.path(), &["profile", "set", "height", "180"]);
    let shown = run_json(dir.path(), &["profile", "show", "--json"]);
    assert_eq!(shown["profile"]["height"], 180.0);
    assert!((shown["step_length_m"].as_f64().unwrap() - 0.72).abs() < 1e-9);
}

#[test]
fn test_profile_rejects_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["profile", "set", "age", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"));
}

#[test]
fn test_food_add_edit_delete() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    run_ok(d, &["food", "add", "apple", "--common", "--serving", "200", "--meal", "lunch", "--date", "2026-03-01"]);
    run_ok(d, &["food", "add", "Toast", "--calories", "250", "--carbs", "45", "--date", "2026-03-01"]);

    let log = run_json(d, &["food", "list", "--date", "2026-03-01", "--json"]);
    let foods = log["foods"].as_array().unwrap();
    assert_eq!(foods.len(), 2);
    assert_eq!(foods[0]["name"], "Apple");
    assert_eq!(foods[0]["meal"], "lunch");
    assert_eq!(log["nutrition"]["calories"], 354.0);

    let id = foods[0]["id"].as_str().unwrap().to_string();
    run_ok(d, &["food", "edit", "2026-03-01", &id, "--servings", "2"]);
    let log = run_json(d, &["food", "list", "--date", "2026-03-01", "--json"]);
    assert_eq!(log["foods"][0]["id"], id.as_str());
    assert_eq!(log["foods"][0]["calories"], 208.0);
    assert_eq!(log["nutrition"]["calories"], 458.0);

    run_ok(d, &["food", "delete", "2026-03-01", &id]);
    let log = run_json(d, &["food", "list", "--date", "2026-03-01", "--json"]);
    assert_eq!(log["foods"].as_array().unwrap().len(), 1);
    assert_eq!(log["nutrition"]["calories"], 250.0);
}

#[test]
fn test_food_add_needs_calories() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["food", "add", "Mystery"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--calories"));

    let (_, _, code) = run_cli(dir.path(), &["food", "add", "Apple", "--common", "--meal", "brunch"]);
    assert_ne!(code, 0);
}

#[test]
fn test_food_common_list() {
    let dir = tempfile::tempdir().unwrap();
    let foods = run_json(dir.path(), &["food", "common", "--json"]);
    assert_eq!(foods.as_array().unwrap().len(), 5);
}

#[test]
fn test_run_simulate_saves_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_ok(
        dir.path(),
        &["run", "simulate", "--fixes", "40", "--weak-from", "10", "--weak-to", "15", "--json"],
    );
    let events: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events[0]["type"], "RunStarted");
    let switches = events.iter().filter(|e| e["type"] == "SourceSwitched").count();
    assert_eq!(switches, 2);
    assert_eq!(events.last().unwrap()["type"], "RunSaved");

    let stats = run_json(dir.path(), &["stats", "--json"]);
    assert_eq!(stats["total_runs"], 1);
}

#[test]
fn test_short_run_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_ok(dir.path(), &["run", "simulate", "--fixes", "5"]);
    assert!(stdout.contains("run discarded"));
    let stats = run_json(dir.path(), &["stats", "--json"]);
    assert_eq!(stats["total_runs"], 0);
}

#[test]
fn test_run_replay_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let track = dir.path().join("track.jsonl");
    let lines: Vec<String> = (0..30)
        .map(|i| {
            format!(
                r#"{{"latitude": 0.0, "longitude": {}, "accuracy": 5.0, "status": "good", "timestamp": "2026-03-01T12:{:02}:{:02}Z"}}"#,
                i as f64 * 0.0002,
                (i * 5) / 60,
                (i * 5) % 60
            )
        })
        .collect();
    std::fs::write(&track, lines.join("\n")).unwrap();

    run_ok(dir.path(), &["run", "replay", track.to_str().unwrap()]);
    let stats = run_json(dir.path(), &["stats", "--json"]);
    assert_eq!(stats["total_runs"], 1);
    let distance = stats["total_distance_m"].as_f64().unwrap();
    assert!((distance - 29.0 * 22.239).abs() < 5.0, "distance {distance}");
}

#[test]
fn test_today_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    run_ok(d, &["food", "add", "egg", "--common", "--date", "2026-03-10"]);

    let summary = run_json(d, &["today", "--date", "2026-03-11", "--json"]);
    assert_eq!(summary["food_date"], "2026-03-10");
    assert_eq!(summary["food_count"], 1);
    assert_eq!(summary["run_count"], 0);

    let calendar = run_json(d, &["history", "month", "--year", "2026", "--month", "3", "--json"]);
    let marked: Vec<&Value> = calendar["days"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|day| day["has_data"] == true)
        .collect();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0]["date"], "2026-03-10");

    let text = run_ok(d, &["history", "month", "--year", "2026", "--month", "3"]);
    assert!(text.contains("10*"));

    let detail = run_json(d, &["history", "day", "2026-03-10", "--json"]);
    assert_eq!(detail["foods"].as_array().unwrap().len(), 1);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    assert_eq!(run_ok(d, &["config", "get", "tracking.min_run_distance_m"]).trim(), "100.0");
    run_ok(d, &["config", "set", "tracking.min_run_distance_m", "50"]);
    assert_eq!(run_ok(d, &["config", "get", "tracking.min_run_distance_m"]).trim(), "50.0");

    let (_, stderr, code) = run_cli(d, &["config", "get", "nope.nothing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));

    run_ok(d, &["config", "reset"]);
    assert_eq!(run_ok(d, &["config", "get", "tracking.min_run_distance_m"]).trim(), "100.0");
}

#[test]
fn test_data_clear_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path().join("data");
    run_ok(&d, &["food", "add", "milk", "--common", "--date", "2026-03-10"]);

    let (_, stderr, code) = run_cli(&d, &["data", "clear"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--yes"));

    let stdout = run_ok(&d, &["data", "backup"]);
    assert!(stdout.contains("healthtrack_backup_"));

    run_ok(&d, &["data", "clear", "--yes"]);
    let log = run_json(&d, &["food", "list", "--date", "2026-03-10", "--json"]);
    assert!(log["foods"].as_array().unwrap().is_empty());
}

#[test]
fn test_sync_without_cloud_config() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["sync", "status"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("cloud sync unavailable"));
}

#[test]
fn test_failed_restore_shows_a_storage_hint() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path().join("data");
    let missing = dir.path().join("no_such_backup");
    let (_, stderr, code) = run_cli(&d, &["data", "restore", missing.to_str().unwrap(), "--yes"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error: Storage error"));
    assert!(stderr.contains("hint: Storage access problem"));
}

#[test]
fn test_unreachable_food_database_is_reported_as_a_network_problem() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    run_ok(d, &["config", "set", "food_api.base_url", "http://127.0.0.1:1"]);
    run_ok(d, &["config", "set", "food_api.timeout_secs", "3"]);

    let (_, stderr, code) = run_cli(d, &["food", "barcode", "3017620422003"]);
    assert_ne!(code, 0);
    let lower = stderr.to_lowercase();
    assert!(lower.contains("network") || lower.contains("connection"), "{stderr}");
    assert!(!stderr.contains("Unexpected response"));
}

#[test]
fn test_config_theme_passes_ui_settings_through() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    let theme = run_json(d, &["config", "theme", "--json"]);
    assert_eq!(theme["scheme"], "light");
    assert!(theme["font_family"].is_null());

    run_ok(d, &["config", "set", "ui.dark_mode", "true"]);
    run_ok(d, &["config", "set", "ui.font_family", "Noto Sans CJK"]);
    let theme = run_json(d, &["config", "theme", "--json"]);
    assert_eq!(theme["scheme"], "dark");
    assert_eq!(theme["font_family"], "Noto Sans CJK");
    assert_eq!(theme["font_size"], 15);
}
