//! Bottom legend band: greedy row packing, swatch + label per entry.
//!
//! Hidden entries stay in the legend, drawn muted with a hollow swatch, so they
//! can be found and toggled back on.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::util::{INK, MUTED, estimate_text_width_px, hex_color};
use crate::dashboard::LegendEntry;
use crate::palette::LineDash;

// Layout constants; the estimator and the painter must agree.
const FONT_PX: u32 = 13;
const LINE_H: i32 = FONT_PX as i32 + 6;
const PAD_BAND: i32 = 8;
const SWATCH_W: i32 = 18;
const SWATCH_TO_TEXT: i32 = 6;
const TRAILING_GAP: i32 = 16;

fn block_width(label: &str) -> i32 {
    SWATCH_W + SWATCH_TO_TEXT + estimate_text_width_px(label, FONT_PX) as i32 + TRAILING_GAP
}

/// Pack entries into rows that fit `total_w` pixels; returns entry indices per row.
fn pack_rows(entries: &[LegendEntry], start_x: i32, total_w: i32) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut cur: Vec<usize> = Vec::new();
    let mut x = start_x;
    for (i, e) in entries.iter().enumerate() {
        let w = block_width(&e.label);
        if x + w > total_w && !cur.is_empty() {
            rows.push(std::mem::take(&mut cur));
            x = start_x;
        }
        cur.push(i);
        x += w;
    }
    if !cur.is_empty() {
        rows.push(cur);
    }
    rows
}

/// Height in pixels the band needs for `entries` at canvas width `total_w`.
pub fn legend_height_px(entries: &[LegendEntry], start_x: i32, total_w: i32) -> i32 {
    if entries.is_empty() {
        return 0;
    }
    let rows = pack_rows(entries, start_x, total_w).len() as i32;
    PAD_BAND * 2 + rows * LINE_H
}

/// Draw the legend into `area`. `as_lines` draws line samples (honoring the
/// dash style) instead of filled squares.
pub fn draw_legend_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[LegendEntry],
    start_x: i32,
    as_lines: bool,
) -> Result<()> {
    area.fill(&WHITE).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let (w, _) = area.dim_in_pixel();

    let label_style = TextStyle::from((FontFamily::SansSerif, FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Center))
        .color(&INK);
    let hidden_style = TextStyle::from((FontFamily::SansSerif, FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Center))
        .color(&MUTED);

    let mut y = PAD_BAND + LINE_H / 2;
    for row in pack_rows(entries, start_x, w as i32) {
        let mut x = start_x;
        for i in row {
            let e = &entries[i];
            let color = if e.visible { hex_color(&e.color) } else { MUTED };
            if as_lines {
                draw_line_sample(area, x, x + SWATCH_W, y, color, e.dash)?;
            } else {
                let style = if e.visible {
                    color.filled()
                } else {
                    color.stroke_width(1)
                };
                area.draw(&Rectangle::new([(x + 3, y - 6), (x + 15, y + 6)], style))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
            let style = if e.visible { &label_style } else { &hidden_style };
            area.draw(&Text::new(
                e.label.as_str(),
                (x + SWATCH_W + SWATCH_TO_TEXT, y),
                style.clone(),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            x += block_width(&e.label);
        }
        y += LINE_H;
    }
    Ok(())
}

fn draw_line_sample<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    start_x: i32,
    end_x: i32,
    y: i32,
    color: RGBColor,
    dash: LineDash,
) -> Result<()> {
    let style = color.stroke_width(2);
    match dash {
        LineDash::Solid => {
            area.draw(&PathElement::new(vec![(start_x, y), (end_x, y)], style))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
        LineDash::Dashed => {
            let mut x = start_x;
            while x < end_x {
                let seg_end = (x + 5).min(end_x);
                area.draw(&PathElement::new(vec![(x, y), (seg_end, y)], style))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                x = seg_end + 3;
            }
        }
    }
    Ok(())
}
