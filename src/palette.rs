//! Static chart configuration: default series palette, display labels and the
//! allow-list of plottable fields for multi-line charts.

use serde::{Deserialize, Serialize};

/// Default series palette, assigned round-robin.
/// Order: Blue, Green, Amber, Red, Purple, Pink, Cyan, Lime, Orange, Indigo.
pub const DEFAULT_CHART_COLORS: [&str; 10] = [
    "#3b82f6", // blue
    "#10b981", // green
    "#f59e0b", // amber
    "#ef4444", // red
    "#8b5cf6", // purple
    "#ec4899", // pink
    "#06b6d4", // cyan
    "#84cc16", // lime
    "#f97316", // orange
    "#6366f1", // indigo
];

/// Get a color from the default palette.
#[inline]
pub fn palette_color(idx: usize) -> &'static str {
    DEFAULT_CHART_COLORS[idx % DEFAULT_CHART_COLORS.len()]
}

/// Human-readable labels for the known payload fields.
const KEY_LABELS: [(&str, &str); 10] = [
    ("happy", "Happy"),
    ("tired", "Tired"),
    ("stressed", "Stressed"),
    ("running", "Running"),
    ("cycling", "Cycling"),
    ("stretching", "Stretching"),
    ("bugs", "Bugs"),
    ("productivity", "Productivity"),
    ("meetingsMissed", "Meetings missed"),
    ("morale", "Morale"),
];

/// Display label for a field, falling back to the raw key.
pub fn key_label(key: &str) -> &str {
    KEY_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Which Y axis a line is plotted against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Left,
    Right,
}

/// Line stroke pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dashed,
}

/// Marker shape for data points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Circle,
    Square,
}

/// Fixed presentation of one plottable field, shared by every owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldConfig {
    pub axis: AxisSide,
    pub dash: LineDash,
    pub marker: MarkerShape,
}

/// Closed allow-list of fields a multi-line chart will plot.
///
/// New analytics dimensions must be added here explicitly; numeric fields that
/// are not listed are never turned into lines.
const FIELD_CONFIG: [(&str, FieldConfig); 4] = [
    (
        "bugs",
        FieldConfig {
            axis: AxisSide::Left,
            dash: LineDash::Solid,
            marker: MarkerShape::Circle,
        },
    ),
    (
        "productivity",
        FieldConfig {
            axis: AxisSide::Right,
            dash: LineDash::Dashed,
            marker: MarkerShape::Square,
        },
    ),
    (
        "meetingsMissed",
        FieldConfig {
            axis: AxisSide::Left,
            dash: LineDash::Solid,
            marker: MarkerShape::Circle,
        },
    ),
    (
        "morale",
        FieldConfig {
            axis: AxisSide::Right,
            dash: LineDash::Dashed,
            marker: MarkerShape::Square,
        },
    ),
];

/// Look up the presentation of a plottable field.
pub fn field_config(field: &str) -> Option<FieldConfig> {
    FIELD_CONFIG
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, cfg)| *cfg)
}

/// Parse `#rrggbb` (or `#rgb`) into RGB components.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some((out[0], out[1], out[2]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(0), palette_color(DEFAULT_CHART_COLORS.len()));
        assert_eq!(palette_color(3), "#ef4444");
    }

    #[test]
    fn labels_fall_back_to_key() {
        assert_eq!(key_label("happy"), "Happy");
        assert_eq!(key_label("meetingsMissed"), "Meetings missed");
        assert_eq!(key_label("sleepHours"), "sleepHours");
    }

    #[test]
    fn field_config_is_closed() {
        let cfg = field_config("productivity").unwrap();
        assert_eq!(cfg.axis, AxisSide::Right);
        assert_eq!(cfg.dash, LineDash::Dashed);
        assert!(field_config("cupsPerDay").is_none());
    }

    #[test]
    fn parse_hex_variants() {
        assert_eq!(parse_hex("#3b82f6"), Some((0x3b, 0x82, 0xf6)));
        assert_eq!(parse_hex("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex("3b82f6"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }
}
