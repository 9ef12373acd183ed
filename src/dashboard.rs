//! Dashboard composition: one panel per chart, from fetch result to render model.
//!
//! A panel goes `FetchState` → [`PanelView`] (normalized rows plus derived
//! series) → [`RenderModel`] (legend state applied). Only the last step reads
//! the legend store, so building panels is pure.

use crate::api::{Client, Endpoint};
use crate::binding::{LegendBinding, ResolvedSeries, category_text};
use crate::legend::LegendStore;
use crate::models::{FetchState, LineSeries, RawPayload, Row, SeriesDescriptor};
use crate::normalize::{
    OWNER_KEY, derive_category_series, derive_multi_series_lines, derive_stack_keys,
    merge_rows_by_x, payload_rows,
};
use crate::palette::{AxisSide, LineDash, MarkerShape};
use crate::percent::to_percentage_stack;
use std::collections::HashMap;

/// Chart kinds the dashboard draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One bar per category; categories are legend entries.
    Bar,
    /// One slice per category; categories are legend entries.
    Donut,
    /// 100% stacked bars, one stack segment per numeric field.
    StackedBar,
    /// 100% stacked areas, one band per numeric field.
    StackedArea,
    /// One line per (owner, field) on a left and a right Y axis.
    MultiLine,
}

impl ChartKind {
    pub fn is_stacked(&self) -> bool {
        matches!(self, ChartKind::StackedBar | ChartKind::StackedArea)
    }

    pub fn is_per_category(&self) -> bool {
        matches!(self, ChartKind::Bar | ChartKind::Donut)
    }
}

/// Static description of one dashboard chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    /// Must be unique across the dashboard; it keys the legend store.
    pub chart_id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub endpoint: Endpoint,
    /// X-axis field (category field for bar/donut).
    pub x_key: &'static str,
    pub x_label: &'static str,
    pub left_label: &'static str,
    pub right_label: &'static str,
}

/// Value field of the category rows produced by the brand adapter.
pub const CATEGORY_VALUE_KEY: &str = "value";

const fn panel(
    chart_id: &'static str,
    title: &'static str,
    kind: ChartKind,
    endpoint: Endpoint,
    x_key: &'static str,
) -> PanelSpec {
    PanelSpec {
        chart_id,
        title,
        kind,
        endpoint,
        x_key,
        x_label: "",
        left_label: "",
        right_label: "",
    }
}

/// The ten charts of the analytics dashboard.
pub fn standard_panels() -> Vec<PanelSpec> {
    use ChartKind::*;
    use Endpoint::*;
    vec![
        panel("coffee-bar", "Top coffee brands", Bar, TopCoffeeBrands, "name"),
        panel("coffee-donut", "Coffee brand share", Donut, TopCoffeeBrands, "name"),
        panel("snack-bar", "Popular snack brands", Bar, PopularSnackBrands, "name"),
        panel("snack-donut", "Snack brand share", Donut, PopularSnackBrands, "name"),
        panel("mood-stacked-bar", "Weekly mood trend", StackedBar, WeeklyMoodTrend, "week"),
        panel("workout-stacked-bar", "Weekly workout trend", StackedBar, WeeklyWorkoutTrend, "week"),
        panel("mood-stacked-area", "Weekly mood trend", StackedArea, WeeklyMoodTrend, "week"),
        panel("workout-stacked-area", "Weekly workout trend", StackedArea, WeeklyWorkoutTrend, "week"),
        PanelSpec {
            x_label: "Coffee (cups/day)",
            left_label: "Bugs",
            right_label: "Productivity",
            ..panel("coffee-consumption", "Coffee consumption", MultiLine, CoffeeConsumption, "cupsPerDay")
        },
        PanelSpec {
            x_label: "Snacks (per day)",
            left_label: "Meetings missed",
            right_label: "Morale",
            ..panel("snack-impact", "Snack impact", MultiLine, SnackImpact, "snackCount")
        },
    ]
}

/// Normalized data of a panel that has something to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub rows: Vec<Row>,
    /// Legend entries: fields for stacked/multi-line charts, categories for bar/donut.
    pub series: Vec<SeriesDescriptor>,
    /// Multi-line presentation; empty for other kinds.
    pub lines: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Loading,
    /// The fetch itself failed.
    Failed,
    /// The fetch succeeded but there is nothing to plot.
    Empty,
    Ready(ChartData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub spec: PanelSpec,
    pub view: PanelView,
}

/// Normalize one fetch result for one chart.
pub fn build_panel(spec: &PanelSpec, state: &FetchState<RawPayload>) -> Panel {
    let view = if state.is_loading {
        PanelView::Loading
    } else if state.is_error {
        PanelView::Failed
    } else {
        match state.data.as_ref() {
            None => PanelView::Empty,
            Some(payload) => chart_data(spec, payload)
                .map(PanelView::Ready)
                .unwrap_or(PanelView::Empty),
        }
    };
    Panel { spec: *spec, view }
}

fn chart_data(spec: &PanelSpec, payload: &RawPayload) -> Option<ChartData> {
    let rows = payload_rows(payload);
    if rows.is_empty() {
        return None;
    }
    let data = match spec.kind {
        ChartKind::Bar | ChartKind::Donut => ChartData {
            series: derive_category_series(&rows, spec.x_key),
            rows,
            lines: Vec::new(),
        },
        ChartKind::StackedBar | ChartKind::StackedArea => ChartData {
            series: derive_stack_keys(&rows, spec.x_key),
            rows,
            lines: Vec::new(),
        },
        ChartKind::MultiLine => {
            let lines = derive_multi_series_lines(&rows, spec.x_key, OWNER_KEY);
            ChartData {
                series: lines.iter().map(|l| l.descriptor.clone()).collect(),
                rows: merge_rows_by_x(&rows, spec.x_key, OWNER_KEY),
                lines,
            }
        }
    };
    (!data.series.is_empty()).then_some(data)
}

/// Fetch every endpoint the panels need (once each) and build the panels.
pub fn load_dashboard(client: &Client, specs: &[PanelSpec]) -> Vec<Panel> {
    let mut fetched: HashMap<Endpoint, FetchState<RawPayload>> = HashMap::new();
    specs
        .iter()
        .map(|spec| {
            let state = fetched
                .entry(spec.endpoint)
                .or_insert_with(|| client.fetch_state(spec.endpoint));
            build_panel(spec, state)
        })
        .collect()
}

/// One legend entry as shown next to a chart, hidden ones included.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub key: String,
    pub label: String,
    pub color: String,
    pub visible: bool,
    pub dash: LineDash,
}

/// A visible multi-line series ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    pub series: ResolvedSeries,
    pub axis: AxisSide,
    pub dash: LineDash,
    pub marker: MarkerShape,
}

/// Everything a renderer needs, with legend state applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub chart_id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_key: String,
    pub x_label: String,
    pub left_label: String,
    pub right_label: String,
    /// Rows to draw: category-filtered for bar/donut, percentage shares for
    /// stacked kinds, merged by X for multi-line.
    pub rows: Vec<Row>,
    /// Visible series (or categories) in draw order.
    pub series: Vec<ResolvedSeries>,
    /// Visible lines; multi-line only.
    pub lines: Vec<ResolvedLine>,
    pub legend: Vec<LegendEntry>,
}

impl RenderModel {
    /// Color of a visible series or category.
    pub fn color_of(&self, key: &str) -> Option<&str> {
        self.series
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.color.as_str())
    }

    /// Category text of a row (bar/donut).
    pub fn category_of(&self, row: &Row) -> Option<String> {
        row.get(&self.x_key).and_then(category_text)
    }
}

impl Panel {
    /// Mount this panel's legend binding on `store`.
    pub fn binding<'s>(&self, store: &'s LegendStore) -> Option<LegendBinding<'s>> {
        match &self.view {
            PanelView::Ready(data) => {
                Some(LegendBinding::mount(store, self.spec.chart_id, &data.series))
            }
            _ => None,
        }
    }

    /// Apply the current legend state; `None` unless the panel is ready.
    pub fn render_model(&self, store: &LegendStore) -> Option<RenderModel> {
        let PanelView::Ready(data) = &self.view else {
            return None;
        };
        let binding = self.binding(store)?;
        let spec = &self.spec;
        let series = binding.visible_series(&data.series);

        let rows = match spec.kind {
            ChartKind::Bar | ChartKind::Donut => binding.visible_rows(&data.rows, spec.x_key),
            ChartKind::StackedBar | ChartKind::StackedArea => {
                // Shares are taken over every stack key; hiding a segment
                // leaves a gap instead of rescaling the others.
                let keys: Vec<String> = data.series.iter().map(|s| s.key.clone()).collect();
                to_percentage_stack(&data.rows, spec.x_key, &keys)
            }
            ChartKind::MultiLine => data.rows.clone(),
        };

        let lines = data
            .lines
            .iter()
            .filter_map(|l| {
                let resolved = series.iter().find(|s| s.key == l.descriptor.key)?;
                Some(ResolvedLine {
                    series: resolved.clone(),
                    axis: l.axis,
                    dash: l.dash,
                    marker: l.marker,
                })
            })
            .collect();

        let items = binding.items();
        let legend = data
            .series
            .iter()
            .filter_map(|d| {
                let item = items.get(&d.key)?;
                let dash = data
                    .lines
                    .iter()
                    .find(|l| l.descriptor.key == d.key)
                    .map(|l| l.dash)
                    .unwrap_or(LineDash::Solid);
                Some(LegendEntry {
                    key: d.key.clone(),
                    label: item.label.clone().unwrap_or_else(|| d.label.clone()),
                    color: item.color.clone(),
                    visible: item.visible,
                    dash,
                })
            })
            .collect();

        Some(RenderModel {
            chart_id: spec.chart_id.to_string(),
            title: spec.title.to_string(),
            kind: spec.kind,
            x_key: spec.x_key.to_string(),
            x_label: spec.x_label.to_string(),
            left_label: spec.left_label.to_string(),
            right_label: spec.right_label.to_string(),
            rows,
            series,
            lines,
            legend,
        })
    }
}
