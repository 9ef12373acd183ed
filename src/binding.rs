//! Per-chart view onto the [`LegendStore`].

use crate::legend::{LegendMap, LegendStore};
use crate::models::{Row, SeriesDescriptor};
use serde_json::Value;
use std::sync::Arc;

/// A series as it should be drawn right now: the store's color and label
/// applied on top of the static descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub key: String,
    pub color: String,
    pub label: String,
}

/// Binds one chart id to a shared store.
///
/// Mounting initializes the chart's legend the first time only; mounting again
/// (a re-render) leaves colors and visibility as the user last set them.
#[derive(Debug, Clone)]
pub struct LegendBinding<'s> {
    store: &'s LegendStore,
    chart_id: String,
}

impl<'s> LegendBinding<'s> {
    pub fn mount(
        store: &'s LegendStore,
        chart_id: impl Into<String>,
        series: &[SeriesDescriptor],
    ) -> Self {
        let chart_id = chart_id.into();
        if store.get_legend(&chart_id).is_none() {
            store.init_legend(&chart_id, series);
        }
        Self { store, chart_id }
    }

    pub fn chart_id(&self) -> &str {
        &self.chart_id
    }

    /// Current entries; empty if the store has no legend for this chart (e.g.
    /// after a reset).
    pub fn items(&self) -> Arc<LegendMap> {
        self.store.get_legend(&self.chart_id).unwrap_or_default()
    }

    pub fn toggle(&self, key: &str) {
        self.store.toggle_visibility(&self.chart_id, key);
    }

    pub fn update_color(&self, key: &str, color: &str) {
        self.store.update_color(&self.chart_id, key, color);
    }

    /// Keys currently visible, in legend order.
    pub fn visible_keys(&self) -> Vec<String> {
        self.items()
            .iter()
            .filter(|i| i.visible)
            .map(|i| i.key.clone())
            .collect()
    }

    /// Keys without a legend entry count as hidden.
    pub fn is_visible(&self, key: &str) -> bool {
        self.items().get(key).is_some_and(|i| i.visible)
    }

    /// Visible subset of `series`, in the given order, with store colors and
    /// label overrides applied.
    pub fn visible_series(&self, series: &[SeriesDescriptor]) -> Vec<ResolvedSeries> {
        let items = self.items();
        series
            .iter()
            .filter_map(|d| {
                let item = items.get(&d.key)?;
                item.visible.then(|| ResolvedSeries {
                    key: d.key.clone(),
                    color: item.color.clone(),
                    label: item.label.clone().unwrap_or_else(|| d.label.clone()),
                })
            })
            .collect()
    }

    /// For charts whose legend entries are categories (bar, donut): keep only
    /// rows whose `category_key` value names a visible entry.
    pub fn visible_rows(&self, rows: &[Row], category_key: &str) -> Vec<Row> {
        let items = self.items();
        rows.iter()
            .filter(|row| {
                let Some(category) = row.get(category_key).and_then(category_text) else {
                    return false;
                };
                items.get(&category).is_some_and(|i| i.visible)
            })
            .cloned()
            .collect()
    }
}

/// Text form of a category cell (strings as-is, numbers formatted).
pub(crate) fn category_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
