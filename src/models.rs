use crate::palette::{AxisSide, LineDash, MarkerShape};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One flat chart record: the X-axis field plus one numeric field per series.
/// Keys keep insertion order.
pub type Row = Map<String, Value>;

/// Static configuration of one chart series, handed to the legend binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub key: String,
    /// Initial color (hex).
    pub color: String,
    pub label: String,
}

impl SeriesDescriptor {
    pub fn new(key: impl Into<String>, color: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            color: color.into(),
            label: label.into(),
        }
    }
}

/// A multi-line series: one (owner, field) pair with its fixed presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    /// Key is `"<owner>-<field>"`.
    pub descriptor: SeriesDescriptor,
    pub owner: String,
    pub field: String,
    pub axis: AxisSide,
    pub dash: LineDash,
    pub marker: MarkerShape,
}

/// What the data-fetching side knows about one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub is_error: bool,
}

impl<T> FetchState<T> {
    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            is_error: false,
        }
    }

    pub fn failed() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: true,
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            is_error: false,
        }
    }

    /// A finished request that produced no payload.
    pub fn absent() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchState<U> {
        FetchState {
            data: self.data.map(f),
            is_loading: self.is_loading,
            is_error: self.is_error,
        }
    }
}


// ------------------------ Lenient payload decoding ------------------------
//
// Analytics payloads drift in shape: lists come bare or wrapped, and numbers
// sometimes arrive as strings. Decoding never fails; anything unusable becomes
// `None` or an empty list.

/// Items of a listing sent bare (`[...]`) or wrapped (`{"data": [...]}`).
pub fn listing_items(v: &Value) -> &[Value] {
    match v {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Number, or a string holding one.
pub fn lenient_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|x| x.is_finite())
}

/// String, or a number/bool rendered as text.
pub fn lenient_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn array_field<'a>(v: &'a Value, key: &str) -> Option<&'a [Value]> {
    v.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// Brand popularity entry. Field names drift between endpoints, so every field
/// is optional and resolved by fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandEntry {
    pub brand: Option<String>,
    pub name: Option<String>,
    pub value: Option<f64>,
    pub popularity: Option<f64>,
    pub share: Option<f64>,
    pub count: Option<f64>,
}

impl BrandEntry {
    pub fn from_value(v: &Value) -> Self {
        Self {
            brand: lenient_text(v.get("brand")),
            name: lenient_text(v.get("name")),
            value: lenient_f64(v.get("value")),
            popularity: lenient_f64(v.get("popularity")),
            share: lenient_f64(v.get("share")),
            count: lenient_f64(v.get("count")),
        }
    }

    /// First non-blank of `brand`, `name`; else `"Unknown"`.
    pub fn display_name(&self) -> String {
        [&self.brand, &self.name]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.trim().is_empty())
            .unwrap_or("Unknown")
            .to_string()
    }

    /// First non-zero of `value`, `popularity`, `share`, `count`; else `0`.
    pub fn amount(&self) -> f64 {
        [self.value, self.popularity, self.share, self.count]
            .into_iter()
            .flatten()
            .find(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(0.0)
    }
}

/// `{teams: [{team, series: [{cups, bugs, productivity}]}]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamsPayload {
    pub teams: Vec<TeamSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamSeries {
    pub team: Option<String>,
    /// `None` when the payload has no usable series array.
    pub series: Option<Vec<CoffeeMetric>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoffeeMetric {
    pub cups: Option<f64>,
    pub bugs: Option<f64>,
    pub productivity: Option<f64>,
}

impl TeamsPayload {
    pub fn from_value(v: &Value) -> Self {
        let teams = array_field(v, "teams")
            .unwrap_or(&[])
            .iter()
            .filter(|t| t.is_object())
            .map(|t| TeamSeries {
                team: lenient_text(t.get("team")),
                series: array_field(t, "series").map(|items| {
                    items
                        .iter()
                        .filter(|m| m.is_object())
                        .map(|m| CoffeeMetric {
                            cups: lenient_f64(m.get("cups")),
                            bugs: lenient_f64(m.get("bugs")),
                            productivity: lenient_f64(m.get("productivity")),
                        })
                        .collect()
                }),
            })
            .collect();
        Self { teams }
    }
}

/// `{departments: [{name, metrics: [{snacks, meetingsMissed, morale}]}]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepartmentsPayload {
    pub departments: Vec<DepartmentMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepartmentMetrics {
    pub name: Option<String>,
    pub metrics: Option<Vec<SnackMetric>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnackMetric {
    pub snacks: Option<f64>,
    pub meetings_missed: Option<f64>,
    pub morale: Option<f64>,
}

impl DepartmentsPayload {
    pub fn from_value(v: &Value) -> Self {
        let departments = array_field(v, "departments")
            .unwrap_or(&[])
            .iter()
            .filter(|d| d.is_object())
            .map(|d| DepartmentMetrics {
                name: lenient_text(d.get("name")),
                metrics: array_field(d, "metrics").map(|items| {
                    items
                        .iter()
                        .filter(|m| m.is_object())
                        .map(|m| SnackMetric {
                            snacks: lenient_f64(m.get("snacks")),
                            meetings_missed: lenient_f64(m.get("meetingsMissed")),
                            morale: lenient_f64(m.get("morale")),
                        })
                        .collect()
                }),
            })
            .collect();
        Self { departments }
    }
}

/// Raw payload of one analytics endpoint, tagged by shape.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// Flat list of `{brand|name, value|popularity|share|count}`.
    Brands(Vec<BrandEntry>),
    /// Flat list of `{week, <field>: number, ...}`.
    Weekly(Vec<Row>),
    Teams(TeamsPayload),
    Departments(DepartmentsPayload),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_scalars() {
        assert_eq!(lenient_f64(Some(&json!("42"))), Some(42.0));
        assert_eq!(lenient_f64(Some(&json!("n/a"))), None);
        assert_eq!(lenient_f64(Some(&json!(null))), None);
        assert_eq!(lenient_text(Some(&json!(7))), Some("7".to_string()));
        assert_eq!(lenient_text(Some(&json!([1]))), None);
    }

    #[test]
    fn listing_shapes() {
        assert_eq!(listing_items(&json!([1, 2])).len(), 2);
        assert_eq!(listing_items(&json!({"data": [1]})).len(), 1);
        assert!(listing_items(&json!({"data": null})).is_empty());
        assert!(listing_items(&json!("nope")).is_empty());
    }
}
