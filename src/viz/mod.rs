//! Visualization: render a dashboard [`RenderModel`] to **SVG**.
//!
//! - Bar and donut charts draw one mark per visible category
//! - Stacked bar/area charts draw visible segments on a 0–100% axis; hidden
//!   segments leave a gap instead of rescaling the rest
//! - Multi-line charts use a left and a right Y axis; dashed lines and square
//!   markers come from the field allow-list
//! - The legend sits in a band below the plot and keeps hidden entries (muted)

pub mod legend;
pub mod util;

use crate::dashboard::{CATEGORY_VALUE_KEY, ChartKind, RenderModel};
use crate::normalize::number_or_zero;
use crate::palette::{AxisSide, LineDash, MarkerShape};
use anyhow::{Context, Result, anyhow};
use num_format::Locale;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;

use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use legend::{draw_legend_panel, legend_height_px};
use util::{MUTED, axis_max, dash_segments, format_value, hex_color, map_locale};

const MARGIN: u32 = 16;
const LEGEND_X: i32 = 16;
const TITLE_PX: u32 = 20;

/// Render a chart to an SVG document with `"en"` number formatting.
pub fn render_svg(model: &RenderModel, width: u32, height: u32) -> Result<String> {
    render_svg_locale(model, width, height, "en")
}

/// Render a chart to an SVG document; `locale_tag` picks the tick-label digit grouping.
pub fn render_svg_locale(
    model: &RenderModel,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<String> {
    let locale = map_locale(locale_tag);
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (width, height)).into_drawing_area();
        draw_model(&root, model, locale)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(buf)
}

/// Render a chart and write it to `path`.
pub fn write_svg<P: AsRef<Path>>(
    model: &RenderModel,
    path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    write_svg_locale(model, path, width, height, "en")
}

pub fn write_svg_locale<P: AsRef<Path>>(
    model: &RenderModel,
    path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<()> {
    let svg = render_svg_locale(model, width, height, locale_tag)?;
    std::fs::write(path.as_ref(), svg)
        .with_context(|| format!("write {}", path.as_ref().display()))
}

/// Title plus a centered status line, for panels that are loading, failed or
/// have nothing to show.
pub fn render_status_svg(title: &str, message: &str, width: u32, height: u32) -> Result<String> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
        draw_message(&root, title, message)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(buf)
}

fn draw_model<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    model: &RenderModel,
    locale: &Locale,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = root.dim_in_pixel();

    let legend_h = legend_height_px(&model.legend, LEGEND_X, w as i32);
    let (plot, legend_area) = root.split_vertically((h as i32 - legend_h).max(40));

    if model.series.is_empty() {
        draw_message(&plot, &model.title, "All series are hidden")?;
    } else {
        match model.kind {
            ChartKind::Bar => draw_bar(&plot, model, locale)?,
            ChartKind::Donut => draw_donut(&plot, model)?,
            ChartKind::StackedBar => draw_stacked_bar(&plot, model)?,
            ChartKind::StackedArea => draw_stacked_area(&plot, model)?,
            ChartKind::MultiLine => draw_multi_line(&plot, model, locale)?,
        }
    }

    if legend_h > 0 {
        draw_legend_panel(
            &legend_area,
            &model.legend,
            LEGEND_X,
            model.kind == ChartKind::MultiLine,
        )?;
    }
    Ok(())
}

fn draw_message<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    message: &str,
) -> Result<()> {
    let inner = area
        .titled(title, (FontFamily::SansSerif, TITLE_PX))
        .map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = inner.dim_in_pixel();
    let style = TextStyle::from((FontFamily::SansSerif, 14))
        .pos(Pos::new(HPos::Center, VPos::Center))
        .color(&MUTED);
    inner
        .draw(&Text::new(message, (w as i32 / 2, h as i32 / 2), style))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Tick label for an index axis: the category at integer positions, blank elsewhere.
fn index_label(labels: &[String], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

fn draw_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    model: &RenderModel,
    locale: &Locale,
) -> Result<()> {
    let bars: Vec<(String, f64, RGBColor)> = model
        .rows
        .iter()
        .filter_map(|r| {
            let cat = model.category_of(r)?;
            let color = hex_color(model.color_of(&cat)?);
            Some((cat, number_or_zero(r.get(CATEGORY_VALUE_KEY)), color))
        })
        .collect();
    if bars.is_empty() {
        return draw_message(area, &model.title, "No data");
    }

    let n = bars.len();
    let y_max = axis_max(bars.iter().map(|b| b.1).fold(0.0, f64::max));
    let labels: Vec<String> = bars.iter().map(|b| b.0.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(model.title.as_str(), (FontFamily::SansSerif, TITLE_PX))
        .set_label_area_size(LabelAreaPosition::Left, 56)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_fmt = |v: &f64| index_label(&labels, *v);
    let y_fmt = |v: &f64| format_value(*v, locale);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_desc(model.x_label.as_str())
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, v, color))| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *v)], color.filled())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_donut<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    model: &RenderModel,
) -> Result<()> {
    let slices: Vec<(f64, RGBColor)> = model
        .rows
        .iter()
        .filter_map(|r| {
            let cat = model.category_of(r)?;
            let color = hex_color(model.color_of(&cat)?);
            let v = number_or_zero(r.get(CATEGORY_VALUE_KEY));
            (v > 0.0).then_some((v, color))
        })
        .collect();
    let total: f64 = slices.iter().map(|s| s.0).sum();
    if slices.is_empty() || total <= 0.0 {
        return draw_message(area, &model.title, "No data");
    }

    let area = area
        .titled(model.title.as_str(), (FontFamily::SansSerif, TITLE_PX))
        .map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = area.dim_in_pixel();
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let outer = (w.min(h) as f64 / 2.0 - MARGIN as f64).max(10.0);
    let inner = outer * 0.55;
    let share_style = TextStyle::from((FontFamily::SansSerif, 12))
        .pos(Pos::new(HPos::Center, VPos::Center))
        .color(&WHITE);

    let at = |r: f64, a: f64| ((cx + r * a.cos()).round() as i32, (cy + r * a.sin()).round() as i32);

    let mut start = -FRAC_PI_2; // 12 o'clock, clockwise
    for (v, color) in slices {
        let sweep = v / total * TAU;
        let steps = (sweep / TAU * 120.0).ceil().max(2.0) as usize;
        let mut pts: Vec<(i32, i32)> = Vec::with_capacity(2 * steps + 2);
        for k in 0..=steps {
            pts.push(at(outer, start + sweep * k as f64 / steps as f64));
        }
        for k in (0..=steps).rev() {
            pts.push(at(inner, start + sweep * k as f64 / steps as f64));
        }
        area.draw(&Polygon::new(pts, color.filled()))
            .map_err(|e| anyhow!("{:?}", e))?;

        let share = v / total * 100.0;
        if share >= 5.0 {
            area.draw(&Text::new(
                format!("{share:.0}%"),
                at((outer + inner) / 2.0, start + sweep / 2.0),
                share_style.clone(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
        start += sweep;
    }
    Ok(())
}

fn percent_label(v: &f64) -> String {
    format!("{v:.0}%")
}

fn draw_stacked_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    model: &RenderModel,
) -> Result<()> {
    let n = model.rows.len();
    if n == 0 {
        return draw_message(area, &model.title, "No data");
    }
    let labels: Vec<String> = model
        .rows
        .iter()
        .map(|r| model.category_of(r).unwrap_or_default())
        .collect();

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(model.title.as_str(), (FontFamily::SansSerif, TITLE_PX))
        .set_label_area_size(LabelAreaPosition::Left, 48)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..100f64)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_fmt = |v: &f64| index_label(&labels, *v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&percent_label)
        .label_style((FontFamily::SansSerif, 12))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let mut rects = Vec::new();
    for (i, row) in model.rows.iter().enumerate() {
        let x = i as f64;
        let mut base = 0.0;
        for s in &model.series {
            let v = number_or_zero(row.get(&s.key));
            if v > 0.0 {
                rects.push(Rectangle::new(
                    [(x - 0.35, base), (x + 0.35, base + v)],
                    hex_color(&s.color).filled(),
                ));
            }
            base += v;
        }
    }
    chart
        .draw_series(rects)
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_stacked_area<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    model: &RenderModel,
) -> Result<()> {
    let n = model.rows.len();
    if n == 0 {
        return draw_message(area, &model.title, "No data");
    }
    let labels: Vec<String> = model
        .rows
        .iter()
        .map(|r| model.category_of(r).unwrap_or_default())
        .collect();
    let (x0, x1) = if n == 1 {
        (-0.5, 0.5)
    } else {
        (0.0, n as f64 - 1.0)
    };

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(model.title.as_str(), (FontFamily::SansSerif, TITLE_PX))
        .set_label_area_size(LabelAreaPosition::Left, 48)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, 0f64..100f64)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_fmt = |v: &f64| index_label(&labels, *v);
    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&percent_label)
        .label_style((FontFamily::SansSerif, 12))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let mut lower = vec![0.0f64; n];
    for s in &model.series {
        let upper: Vec<f64> = model
            .rows
            .iter()
            .zip(&lower)
            .map(|(row, base)| base + number_or_zero(row.get(&s.key)))
            .collect();
        let color = hex_color(&s.color);

        let top: Vec<(f64, f64)> = upper.iter().enumerate().map(|(i, y)| (i as f64, *y)).collect();
        let mut band = top.clone();
        band.extend(lower.iter().enumerate().rev().map(|(i, y)| (i as f64, *y)));

        chart
            .draw_series(std::iter::once(Polygon::new(band, color.mix(0.6).filled())))
            .map_err(|e| anyhow!("{:?}", e))?;
        chart
            .draw_series(std::iter::once(PathElement::new(top, color.stroke_width(2))))
            .map_err(|e| anyhow!("{:?}", e))?;
        lower = upper;
    }
    Ok(())
}

fn draw_multi_line<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    model: &RenderModel,
    locale: &Locale,
) -> Result<()> {
    let xs: Vec<f64> = model
        .rows
        .iter()
        .filter_map(|r| r.get(&model.x_key).and_then(|v| v.as_f64()))
        .filter(|x| x.is_finite())
        .collect();
    if xs.is_empty() || model.lines.is_empty() {
        return draw_message(area, &model.title, "No data");
    }
    let (mut x0, mut x1) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(*x), hi.max(*x)));
    if x1 - x0 < f64::EPSILON {
        x0 -= 1.0;
        x1 += 1.0;
    }

    // Points per line; rows lacking the series are skipped so the line connects across gaps.
    let points: Vec<Vec<(f64, f64)>> = model
        .lines
        .iter()
        .map(|l| {
            model
                .rows
                .iter()
                .filter_map(|r| {
                    let x = r.get(&model.x_key)?.as_f64()?;
                    let y = r.get(&l.series.key)?.as_f64()?;
                    (x.is_finite() && y.is_finite()).then_some((x, y))
                })
                .collect()
        })
        .collect();

    let side_max = |side: AxisSide| {
        model
            .lines
            .iter()
            .zip(&points)
            .filter(|(l, _)| l.axis == side)
            .flat_map(|(_, pts)| pts.iter().map(|p| p.1))
            .fold(0.0, f64::max)
    };
    let left_max = axis_max(side_max(AxisSide::Left));
    let right_max = axis_max(side_max(AxisSide::Right));

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(model.title.as_str(), (FontFamily::SansSerif, TITLE_PX))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Right, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(x0..x1, 0f64..left_max)
        .map_err(|e| anyhow!("{:?}", e))?
        .set_secondary_coord(x0..x1, 0f64..right_max);

    let y_fmt = |v: &f64| format_value(*v, locale);
    chart
        .configure_mesh()
        .x_desc(model.x_label.as_str())
        .y_desc(model.left_label.as_str())
        .x_label_formatter(&y_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;
    chart
        .configure_secondary_axes()
        .y_desc(model.right_label.as_str())
        .y_label_formatter(&y_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (line, pts) in model.lines.iter().zip(points) {
        // Right-axis values are drawn in left-axis space, scaled to the right axis range.
        let scale = match line.axis {
            AxisSide::Left => 1.0,
            AxisSide::Right => left_max / right_max,
        };
        let pts: Vec<(f64, f64)> = pts.into_iter().map(|(x, y)| (x, y * scale)).collect();
        let color = hex_color(&line.series.color);

        match line.dash {
            LineDash::Solid => {
                chart
                    .draw_series(LineSeries::new(pts.clone(), color.stroke_width(2)))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            LineDash::Dashed => {
                let segs = dash_segments(&pts, x1 - x0, left_max, 0.025, 0.015);
                chart
                    .draw_series(
                        segs.into_iter()
                            .map(|seg| PathElement::new(seg, color.stroke_width(2))),
                    )
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        match line.marker {
            MarkerShape::Circle => {
                chart
                    .draw_series(pts.iter().map(|p| Circle::new(*p, 4, color.filled())))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            MarkerShape::Square => {
                chart
                    .draw_series(pts.iter().map(|p| {
                        EmptyElement::at(*p) + Rectangle::new([(-4, -4), (4, 4)], color.filled())
                    }))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_labels_only_at_integer_ticks() {
        let labels = vec!["W1".to_string(), "W2".to_string()];
        assert_eq!(index_label(&labels, 0.0), "W1");
        assert_eq!(index_label(&labels, 1.0000000001), "W2");
        assert_eq!(index_label(&labels, 0.5), "");
        assert_eq!(index_label(&labels, 2.0), "");
        assert_eq!(index_label(&labels, -1.0), "");
    }
}
