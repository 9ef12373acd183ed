//! Convert stacked absolute values into per-row percentage shares.

use crate::models::Row;
use crate::normalize::number_or_zero;
use serde_json::{Number, Value};

/// Rewrite each row as `{x_key, key: share%...}` over `series_keys`.
///
/// Missing or non-numeric values count as zero. A row whose total is not
/// positive maps every series to `0`, so the output never holds NaN or
/// infinities.
pub fn to_percentage_stack(rows: &[Row], x_key: &str, series_keys: &[String]) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            let total: f64 = series_keys
                .iter()
                .map(|k| number_or_zero(row.get(k)))
                .sum();
            let mut out = Row::new();
            if let Some(x) = row.get(x_key) {
                out.insert(x_key.to_string(), x.clone());
            }
            for k in series_keys {
                let share = if total > 0.0 {
                    number_or_zero(row.get(k)) / total * 100.0
                } else {
                    0.0
                };
                let share = if share.is_finite() { share } else { 0.0 };
                out.insert(
                    k.clone(),
                    Number::from_f64(share)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::from(0)),
                );
            }
            out
        })
        .collect()
}
