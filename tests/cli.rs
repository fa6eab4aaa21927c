use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use tempfile::NamedTempFile;

const SALES_CSV: &str = "category,count\nGizmo,10\nWidget,30\nGizmo,5\n";
const BREAKOUT_CSV: &str = "category,year,count\nGizmo,2023,4\nWidget,2024,7\nGizmo,2024,1\n";

fn rowchart() -> Command {
    Command::cargo_bin("rowchart").unwrap()
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "rowchart failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn cli_shows_help() {
    rowchart()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rowchart"));
}

#[test]
fn cli_lays_out_csv() {
    let mut cmd = rowchart();
    cmd.args(["--dimension", "category", "--metric", "count"])
        .write_stdin(SALES_CSV);
    let layout = stdout_json(&mut cmd);

    assert_eq!(layout["y_labels"], serde_json::json!(["Gizmo", "Widget"]));
    assert_eq!(layout["trimmed_data"][0]["metrics"]["count"].as_f64(), Some(15.0));
    assert_eq!(layout["bars"].as_array().unwrap().len(), 2);
    assert_eq!(layout["width"].as_f64(), Some(620.0));
}

#[test]
fn cli_reads_json_dataset() {
    let input = r#"{
        "cols": [
            {"name": "category", "base_type": "type/Text"},
            {"name": "count", "display_name": "Count", "base_type": "type/Integer"}
        ],
        "rows": [["Gizmo", 2], ["Widget", null], ["Gizmo", 3]]
    }"#;
    let mut cmd = rowchart();
    cmd.args(["--json", "--dimension", "category", "--metric", "count"])
        .write_stdin(input);
    let layout = stdout_json(&mut cmd);

    assert_eq!(layout["trimmed_data"][0]["metrics"]["count"].as_f64(), Some(5.0));
    assert!(layout["trimmed_data"][1]["metrics"]["count"].is_null());
}

#[test]
fn cli_reads_json_records() {
    let input = r#"[{"category": "Gizmo", "count": 2}, {"category": "Widget", "count": 4}]"#;
    let mut cmd = rowchart();
    cmd.args(["--json", "--dimension", "category", "--metric", "count", "--show-values"])
        .write_stdin(input);
    let layout = stdout_json(&mut cmd);

    assert_eq!(layout["show_value_labels"], Value::Bool(true));
    assert_eq!(layout["bars"][1]["label"], "4");
}

#[test]
fn cli_missing_metric_cannot_render() {
    rowchart()
        .args(["--dimension", "category"])
        .write_stdin(SALES_CSV)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot render"));
}

#[test]
fn cli_unknown_column_cannot_render() {
    rowchart()
        .args(["--dimension", "region", "--metric", "count"])
        .write_stdin(SALES_CSV)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("region"));
}

#[test]
fn cli_malformed_json_fails() {
    rowchart()
        .args(["--json", "--dimension", "category", "--metric", "count"])
        .write_stdin("{not json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse JSON"));
}

#[test]
fn cli_click_data() {
    let mut cmd = rowchart();
    cmd.args([
        "--dimension",
        "category",
        "--metric",
        "count",
        "--click",
        "0:1",
    ])
    .write_stdin(SALES_CSV);
    let click = stdout_json(&mut cmd);

    assert_eq!(click["value"].as_f64(), Some(30.0));
    assert_eq!(click["column"]["name"], "count");
    assert_eq!(click["dimensions"][0]["value"], "Widget");
}

#[test]
fn cli_click_out_of_range() {
    rowchart()
        .args([
            "--dimension",
            "category",
            "--metric",
            "count",
            "--click",
            "3:0",
        ])
        .write_stdin(SALES_CSV)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No bar at 3:0"));
}

#[test]
fn cli_hover_breakout() {
    let mut cmd = rowchart();
    cmd.args([
        "--dimension",
        "category",
        "--breakout",
        "year",
        "--metric",
        "count",
        "--hover",
        "1:0",
    ])
    .write_stdin(BREAKOUT_CSV);
    let hover = stdout_json(&mut cmd);

    let rows = hover["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["value"], "Gizmo");
    assert_eq!(rows[1]["key"], "year");
    assert_eq!(rows[1]["value"], "2024");
    assert_eq!(rows[2]["value"].as_f64(), Some(1.0));
}

#[test]
fn cli_settings_file_with_overrides() {
    let mut settings = NamedTempFile::new().unwrap();
    write!(
        settings,
        r#"{{
            "graph.dimensions": ["category"],
            "graph.metrics": ["count"],
            "graph.show_goal": true,
            "graph.goal_value": 40,
            "graph.goal_label": "Target"
        }}"#
    )
    .unwrap();

    let mut cmd = rowchart();
    cmd.arg("--settings")
        .arg(settings.path())
        .args(["--goal-label", "Quota", "--max-categories", "1"])
        .write_stdin(SALES_CSV);
    let layout = stdout_json(&mut cmd);

    assert_eq!(layout["goal"]["label"], "Quota");
    assert_eq!(layout["goal"]["value"].as_f64(), Some(40.0));
    assert_eq!(layout["y_labels"], serde_json::json!(["All values"]));
}

#[test]
fn cli_normalized_stack() {
    let csv = "category,a,b\nGizmo,3,1\n";
    let mut cmd = rowchart();
    cmd.args([
        "--dimension",
        "category",
        "--metric",
        "a",
        "--metric",
        "b",
        "--stack",
        "normalized",
    ])
    .write_stdin(csv);
    let layout = stdout_json(&mut cmd);

    assert_eq!(layout["stacked"][0][0][1].as_f64(), Some(0.75));
    assert_eq!(layout["stacked"][1][0][1].as_f64(), Some(1.0));
}

#[test]
fn cli_rejects_bad_bar_selector() {
    rowchart()
        .args(["--dimension", "category", "--metric", "count", "--hover", "oops"])
        .write_stdin(SALES_CSV)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SERIES:DATUM"));
}
