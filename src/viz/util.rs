//! Utility functions for visualization: colors, number formatting, text
//! measurement and dash patterns.

use crate::palette::parse_hex;
use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

/// Neutral color for hidden legend entries and fallbacks.
pub const MUTED: RGBColor = RGBColor(156, 163, 175);

/// Axis and label text color.
pub const INK: RGBColor = RGBColor(55, 65, 81);

/// Parse a hex color, falling back to [`MUTED`].
pub fn hex_color(hex: &str) -> RGBColor {
    parse_hex(hex)
        .map(|(r, g, b)| RGBColor(r, g, b))
        .unwrap_or(MUTED)
}

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `de`, `fr`, `es`, `it`, `pt`, `nl`,
/// `ko`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        "ko" | "ko_kr" => &Locale::ko,
        _ => &Locale::en,
    }
}

/// Tick label for absolute values: grouped integers when large, up to two
/// decimals when small.
pub fn format_value(v: f64, locale: &Locale) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        (v.round() as i64).to_formatted_string(locale)
    } else if a >= 100.0 || v.fract() == 0.0 {
        format!("{:.0}", v)
    } else if a >= 10.0 {
        format!("{:.1}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Upper axis bound with ~10% headroom; never below 1.
pub fn axis_max(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Heuristic: estimate pixel width of text (no font metrics on the SVG path).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Split a polyline into dash pieces.
///
/// Lengths are measured after normalizing X by `x_span` and Y by `y_span`, so
/// dashes look alike on both axes. Every piece starts "on".
pub fn dash_segments(
    pts: &[(f64, f64)],
    x_span: f64,
    y_span: f64,
    dash: f64,
    gap: f64,
) -> Vec<Vec<(f64, f64)>> {
    let xs = if x_span > 0.0 { x_span } else { 1.0 };
    let ys = if y_span > 0.0 { y_span } else { 1.0 };
    let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
    if pts.len() < 2 || dash <= 0.0 {
        return out;
    }

    let mut on = true;
    let mut left = dash; // remaining length of the current dash/gap
    let mut cur: Vec<(f64, f64)> = vec![pts[0]];

    for w in pts.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = (((b.0 - a.0) / xs).powi(2) + ((b.1 - a.1) / ys).powi(2)).sqrt();
        if len == 0.0 {
            continue;
        }
        let mut t = 0.0;
        while len - t > left {
            t += left;
            let p = (a.0 + (b.0 - a.0) * t / len, a.1 + (b.1 - a.1) * t / len);
            if on {
                cur.push(p);
                out.push(std::mem::take(&mut cur));
            } else {
                cur = vec![p];
            }
            on = !on;
            left = if on { dash } else { gap.max(0.0) };
        }
        left -= len - t;
        if on {
            cur.push(b);
        } else {
            cur.clear();
        }
    }
    if on && cur.len() >= 2 {
        out.push(cur);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_cover_about_half_the_line() {
        let pts = [(0.0, 0.0), (1.0, 0.0)];
        let segs = dash_segments(&pts, 1.0, 1.0, 0.1, 0.1);
        assert_eq!(segs.len(), 5);
        let covered: f64 = segs.iter().map(|s| s.last().unwrap().0 - s[0].0).sum();
        assert!((covered - 0.5).abs() < 1e-9);
    }

    #[test]
    fn dash_segments_degenerate_input() {
        assert!(dash_segments(&[(0.0, 0.0)], 1.0, 1.0, 0.1, 0.1).is_empty());
        assert!(dash_segments(&[(0.0, 0.0), (1.0, 1.0)], 1.0, 1.0, 0.0, 0.1).is_empty());
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(12345.0, map_locale("en")), "12,345");
        assert_eq!(format_value(12345.0, map_locale("de")), "12.345");
        assert_eq!(format_value(42.0, map_locale("en")), "42");
        assert_eq!(format_value(4.25, map_locale("en")), "4.25");
    }

    #[test]
    fn hex_fallback_is_muted() {
        assert_eq!(hex_color("#ff0000"), RGBColor(255, 0, 0));
        assert_eq!(hex_color("red"), MUTED);
    }
}
