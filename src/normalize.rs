//! Reshape raw analytics payloads into flat chart rows and derive the series
//! each chart should plot.
//!
//! Nothing here fails: missing names become `"Unknown"`, missing numbers
//! become `0`, and empty inputs produce empty outputs.

use crate::binding::category_text;
use crate::models::{
    BrandEntry, DepartmentsPayload, LineSeries, RawPayload, Row, SeriesDescriptor, TeamsPayload,
};
use crate::palette::{field_config, key_label, palette_color};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Default owner field of multi-line rows.
pub const OWNER_KEY: &str = "team";

/// Stack keys from the first row: every numeric field except `x_key`, in the
/// row's own key order.
pub fn derive_stack_keys(rows: &[Row], x_key: &str) -> Vec<SeriesDescriptor> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .iter()
        .filter(|(k, v)| k.as_str() != x_key && v.is_number())
        .enumerate()
        .map(|(idx, (k, _))| SeriesDescriptor::new(k.clone(), palette_color(idx), key_label(k)))
        .collect()
}

/// One line per (owner × configured field).
///
/// Owners come from every row, first-seen order, empty ones dropped. Fields
/// come from the first row and must be numeric and present in the field
/// allow-list; anything else is skipped. All lines of one owner share a color.
pub fn derive_multi_series_lines(rows: &[Row], x_key: &str, owner_key: &str) -> Vec<LineSeries> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut owners: Vec<String> = Vec::new();
    for row in rows {
        if let Some(owner) = owner_of(row, owner_key)
            && !owners.contains(&owner)
        {
            owners.push(owner);
        }
    }

    let fields: Vec<&String> = first
        .iter()
        .filter(|(k, v)| k.as_str() != x_key && k.as_str() != owner_key && v.is_number())
        .map(|(k, _)| k)
        .collect();

    let mut lines = Vec::with_capacity(owners.len() * fields.len());
    for (owner_idx, owner) in owners.iter().enumerate() {
        for field in &fields {
            let Some(cfg) = field_config(field) else {
                continue;
            };
            lines.push(LineSeries {
                descriptor: SeriesDescriptor::new(
                    series_key(owner, field),
                    palette_color(owner_idx),
                    format!("{owner} - {}", key_label(field)),
                ),
                owner: owner.clone(),
                field: field.to_string(),
                axis: cfg.axis,
                dash: cfg.dash,
                marker: cfg.marker,
            });
        }
    }
    lines
}

/// Merge rows that share an X value into one row with `"<owner>-<field>"`
/// columns, sorted ascending by numeric X. Rows without an owner are dropped.
pub fn merge_rows_by_x(rows: &[Row], x_key: &str, owner_key: &str) -> Vec<Row> {
    let mut merged: Vec<Row> = Vec::new();
    for row in rows {
        let Some(owner) = owner_of(row, owner_key) else {
            log::debug!("merge: skipping row without {owner_key:?}");
            continue;
        };
        let x = row.get(x_key).cloned().unwrap_or(Value::Null);
        let idx = match merged.iter().position(|m| m.get(x_key) == Some(&x)) {
            Some(idx) => idx,
            None => {
                let mut fresh = Row::new();
                fresh.insert(x_key.to_string(), x);
                merged.push(fresh);
                merged.len() - 1
            }
        };
        let target = &mut merged[idx];
        for (k, v) in row {
            if k != x_key && k != owner_key {
                target.insert(series_key(&owner, k), v.clone());
            }
        }
    }
    merged.sort_by(|a, b| cmp_numeric(a.get(x_key), b.get(x_key)));
    merged
}

/// One descriptor per distinct category, for charts where each category (not
/// each field) is a legend entry.
pub fn derive_category_series(rows: &[Row], category_key: &str) -> Vec<SeriesDescriptor> {
    let mut out: Vec<SeriesDescriptor> = Vec::new();
    for row in rows {
        let Some(category) = row.get(category_key).and_then(category_text) else {
            continue;
        };
        if out.iter().any(|d| d.key == category) {
            continue;
        }
        let color = palette_color(out.len());
        out.push(SeriesDescriptor::new(category.clone(), color, category));
    }
    out
}

/// Composite legend/column key of a multi-line series.
pub fn series_key(owner: &str, field: &str) -> String {
    format!("{owner}-{field}")
}

/// Numeric value of a cell; missing or non-numeric counts as zero.
pub fn number_or_zero(v: Option<&Value>) -> f64 {
    v.and_then(Value::as_f64)
        .filter(|x| x.is_finite())
        .unwrap_or(0.0)
}

fn owner_of(row: &Row, owner_key: &str) -> Option<String> {
    row.get(owner_key)
        .and_then(category_text)
        .filter(|s| !s.is_empty())
}

// Non-numeric X values sort after numeric ones; ties keep input order.
fn cmp_numeric(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn num(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn num_or_zero(v: Option<f64>) -> Value {
    num(v.filter(|x| x.is_finite()).unwrap_or(0.0))
}

// ------------------------ Payload adapters ------------------------

/// Brand listing → `{name, value}` rows.
pub fn brand_rows(entries: &[BrandEntry]) -> Vec<Row> {
    entries
        .iter()
        .map(|e| {
            let mut row = Row::new();
            row.insert("name".into(), Value::String(e.display_name()));
            row.insert("value".into(), num(e.amount()));
            row
        })
        .collect()
}

/// Team coffee payload → `{cupsPerDay, bugs, productivity, team}` rows.
/// Teams without a series array are skipped.
pub fn team_rows(payload: &TeamsPayload) -> Vec<Row> {
    let mut out = Vec::new();
    for team in &payload.teams {
        let Some(series) = team.series.as_ref() else {
            log::debug!("team {:?} has no series; skipped", team.team);
            continue;
        };
        let owner = team.team.clone().map(Value::String).unwrap_or(Value::Null);
        for m in series {
            let mut row = Row::new();
            row.insert("cupsPerDay".into(), num_or_zero(m.cups));
            row.insert("bugs".into(), num_or_zero(m.bugs));
            row.insert("productivity".into(), num_or_zero(m.productivity));
            row.insert(OWNER_KEY.into(), owner.clone());
            out.push(row);
        }
    }
    out
}

/// Department snack payload → `{snackCount, meetingsMissed, morale, team}` rows.
/// Departments without a metrics array are skipped.
pub fn department_rows(payload: &DepartmentsPayload) -> Vec<Row> {
    let mut out = Vec::new();
    for dept in &payload.departments {
        let Some(metrics) = dept.metrics.as_ref() else {
            log::debug!("department {:?} has no metrics; skipped", dept.name);
            continue;
        };
        let owner = dept.name.clone().map(Value::String).unwrap_or(Value::Null);
        for m in metrics {
            let mut row = Row::new();
            row.insert("snackCount".into(), num_or_zero(m.snacks));
            row.insert("meetingsMissed".into(), num_or_zero(m.meetings_missed));
            row.insert("morale".into(), num_or_zero(m.morale));
            row.insert(OWNER_KEY.into(), owner.clone());
            out.push(row);
        }
    }
    out
}

/// Adapter dispatch over the payload variants.
pub fn payload_rows(payload: &RawPayload) -> Vec<Row> {
    match payload {
        RawPayload::Brands(entries) => brand_rows(entries),
        RawPayload::Weekly(rows) => rows.clone(),
        RawPayload::Teams(p) => team_rows(p),
        RawPayload::Departments(p) => department_rows(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn merge_sorts_numeric_x_and_keeps_ties_stable() {
        let rows = vec![
            row(json!({"x": 3, "a": 1, "team": "A"})),
            row(json!({"x": "n/a", "a": 9, "team": "A"})),
            row(json!({"x": 1, "a": 2, "team": "A"})),
        ];
        let merged = merge_rows_by_x(&rows, "x", "team");
        let xs: Vec<&Value> = merged.iter().map(|r| &r["x"]).collect();
        assert_eq!(xs, [&json!(1), &json!(3), &json!("n/a")]);
    }

    #[test]
    fn merge_skips_ownerless_rows() {
        let rows = vec![
            row(json!({"x": 1, "bugs": 2, "team": null})),
            row(json!({"x": 1, "bugs": 4, "team": "B"})),
        ];
        let merged = merge_rows_by_x(&rows, "x", "team");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 2);
        assert_eq!(merged[0]["B-bugs"], json!(4));
    }

    #[test]
    fn category_series_dedupes_in_order() {
        let rows = vec![
            row(json!({"name": "Blue Bottle", "value": 3})),
            row(json!({"name": "Stumptown", "value": 1})),
            row(json!({"name": "Blue Bottle", "value": 2})),
        ];
        let series = derive_category_series(&rows, "name");
        let keys: Vec<&str> = series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["Blue Bottle", "Stumptown"]);
        assert_ne!(series[0].color, series[1].color);
    }

    #[test]
    fn number_or_zero_ignores_text() {
        assert_eq!(number_or_zero(Some(&json!("12"))), 0.0);
        assert_eq!(number_or_zero(Some(&json!(2.5))), 2.5);
        assert_eq!(number_or_zero(None), 0.0);
    }
}
