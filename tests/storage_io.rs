use dashcharts::storage;
use dashcharts::{Endpoint, Row, normalize::payload_rows};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn weekly() -> Vec<Row> {
    let p = Endpoint::WeeklyWorkoutTrend
        .parse(json!([
            {"week": "W1", "running": 3, "cycling": 1},
            {"week": "W2", "running": 2, "cycling": 2, "stretching": 1}
        ]));
    payload_rows(&p)
}

#[test]
fn save_csv_and_json() {
    let rows = weekly();
    let dir = tempdir().unwrap();

    let csv_path = dir.path().join("workout.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("week,running,cycling,stretching"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());
    assert_eq!(csv_txt.lines().nth(1), Some("W1,3,1,"));

    let json_path = dir.path().join("workout.json");
    storage::save_json(&rows, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json_txt).unwrap();
    assert_eq!(v.as_array().unwrap().len(), rows.len());
    assert_eq!(v[1]["stretching"], json!(1));
}

#[test]
fn csv_cells_cannot_start_formulas() {
    let rows: Vec<Row> = vec![json!({"name": "=HYPERLINK(\"x\")", "value": -2})
        .as_object()
        .cloned()
        .unwrap()];
    let dir = tempdir().unwrap();
    let path = dir.path().join("brands.csv");
    storage::save_csv(&rows, &path).unwrap();
    let txt = fs::read_to_string(&path).unwrap();
    let line = txt.lines().nth(1).unwrap();
    assert!(line.starts_with("\"'=HYPERLINK"), "{line}");
    assert!(line.ends_with(",-2"), "{line}");
}

#[test]
fn empty_rows_write_empty_outputs() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("none.json");
    storage::save_json(&[], &json_path).unwrap();
    assert_eq!(fs::read_to_string(&json_path).unwrap().trim(), "[]");
    assert!(storage::columns(&[]).is_empty());
}
