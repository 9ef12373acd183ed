use crate::models::Row;
use anyhow::Result;
use csv::WriterBuilder;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names across all rows, in first-seen order.
pub fn columns(rows: &[Row]) -> Vec<String> {
    let mut cols: Vec<String> = Vec::new();
    for row in rows {
        for k in row.keys() {
            if !cols.iter().any(|c| c == k) {
                cols.push(k.clone());
            }
        }
    }
    cols
}

// Text starting with one of these is treated as a formula by spreadsheet apps.
fn neutralize(text: &str) -> String {
    match text.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{text}"),
        _ => text.to_string(),
    }
}

fn cell(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => neutralize(s),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => neutralize(&other.to_string()),
    }
}

/// Save rows as CSV with a header; missing cells are left empty.
pub fn save_csv<P: AsRef<Path>>(rows: &[Row], path: P) -> Result<()> {
    let cols = columns(rows);
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(&cols)?;
    for row in rows {
        wtr.write_record(cols.iter().map(|c| cell(row.get(c))))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save rows as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(rows: &[Row], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
