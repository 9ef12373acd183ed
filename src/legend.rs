//! Process-wide legend state, keyed by chart id.
//!
//! Every chart instance owns one [`LegendMap`]: an ordered set of
//! [`LegendItem`]s, one per series (or per category for bar/donut charts).
//! The store hands out `Arc` snapshots. A mutation never edits a snapshot in
//! place; it swaps in a new one for the affected chart, so comparing snapshot
//! pointers is enough to tell whether that chart's legend changed.
//!
//! Operations on unknown chart ids or keys are silent no-ops: a chart may ask
//! for its legend before the first initialization has landed.

use crate::models::SeriesDescriptor;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Toggleable, colorable handle on one rendered series or category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub key: String,
    pub color: String,
    pub visible: bool,
    /// Display override; `None` means "use the series label". A blank descriptor label is stored as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LegendItem {
    fn from_descriptor(d: &SeriesDescriptor) -> Self {
        Self {
            key: d.key.clone(),
            color: d.color.clone(),
            visible: true,
            label: Some(d.label.clone()).filter(|l| !l.is_empty()),
        }
    }
}

/// Legend entries of one chart, in the order their series were declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegendMap {
    items: Vec<LegendItem>,
}

impl LegendMap {
    /// Build from descriptors; a repeated key overwrites the earlier entry but
    /// keeps its position.
    pub fn from_descriptors(items: &[SeriesDescriptor]) -> Self {
        let mut map = LegendMap::default();
        for d in items {
            let item = LegendItem::from_descriptor(d);
            match map.items.iter_mut().find(|i| i.key == d.key) {
                Some(slot) => *slot = item,
                None => map.items.push(item),
            }
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<&LegendItem> {
        self.items.iter().find(|i| i.key == key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut LegendItem> {
        self.items.iter_mut().find(|i| i.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LegendItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a LegendMap {
    type Item = &'a LegendItem;
    type IntoIter = std::slice::Iter<'a, LegendItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Keyed legend store shared by every chart on a dashboard.
#[derive(Debug, Default)]
pub struct LegendStore {
    legends: RwLock<AHashMap<String, Arc<LegendMap>>>,
}

impl LegendStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written map behind
    // (writes are single `insert`/`remove` calls), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, AHashMap<String, Arc<LegendMap>>> {
        self.legends.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AHashMap<String, Arc<LegendMap>>> {
        self.legends.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the legend of `chart_id` with every item visible.
    /// Does nothing if the chart already has a legend, so user edits survive
    /// repeated mounts.
    pub fn init_legend(&self, chart_id: &str, items: &[SeriesDescriptor]) {
        let mut legends = self.write();
        if legends.contains_key(chart_id) {
            return;
        }
        log::debug!("init legend {chart_id} with {} item(s)", items.len());
        legends.insert(
            chart_id.to_string(),
            Arc::new(LegendMap::from_descriptors(items)),
        );
    }

    /// Flip visibility of one entry.
    pub fn toggle_visibility(&self, chart_id: &str, key: &str) {
        self.replace_item(chart_id, key, |item| item.visible = !item.visible);
    }

    /// Overwrite the color of one entry.
    pub fn update_color(&self, chart_id: &str, key: &str, color: &str) {
        self.replace_item(chart_id, key, |item| item.color = color.to_string());
    }

    /// Current legend snapshot of a chart.
    pub fn get_legend(&self, chart_id: &str) -> Option<Arc<LegendMap>> {
        self.read().get(chart_id).cloned()
    }

    /// Drop a chart's legend entirely, e.g. when its series set changes shape.
    pub fn reset_legend(&self, chart_id: &str) {
        if self.write().remove(chart_id).is_some() {
            log::debug!("reset legend {chart_id}");
        }
    }

    /// Chart ids currently holding a legend, sorted.
    pub fn chart_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn replace_item(&self, chart_id: &str, key: &str, edit: impl FnOnce(&mut LegendItem)) {
        let mut legends = self.write();
        let Some(current) = legends.get(chart_id) else {
            return;
        };
        if !current.contains(key) {
            return;
        }
        let mut next = LegendMap::clone(current);
        if let Some(item) = next.get_mut(key) {
            edit(item);
        }
        legends.insert(chart_id.to_string(), Arc::new(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors() -> Vec<SeriesDescriptor> {
        vec![
            SeriesDescriptor::new("happy", "#10b981", "Happy"),
            SeriesDescriptor::new("tired", "#f59e0b", "Tired"),
        ]
    }

    #[test]
    fn duplicate_keys_keep_first_position() {
        let map = LegendMap::from_descriptors(&[
            SeriesDescriptor::new("a", "#000000", "A"),
            SeriesDescriptor::new("b", "#111111", "B"),
            SeriesDescriptor::new("a", "#222222", "A2"),
        ]);
        let keys: Vec<&str> = map.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(map.get("a").unwrap().color, "#222222");
    }

    #[test]
    fn empty_label_is_no_override() {
        let map = LegendMap::from_descriptors(&[SeriesDescriptor::new("a", "#000000", "")]);
        assert_eq!(map.get("a").unwrap().label, None);
    }

    #[test]
    fn toggle_swaps_snapshot_only_for_that_chart() {
        let store = LegendStore::new();
        store.init_legend("one", &descriptors());
        store.init_legend("two", &descriptors());
        let one_before = store.get_legend("one").unwrap();
        let two_before = store.get_legend("two").unwrap();

        store.toggle_visibility("one", "happy");

        let one_after = store.get_legend("one").unwrap();
        let two_after = store.get_legend("two").unwrap();
        assert!(!Arc::ptr_eq(&one_before, &one_after));
        assert!(Arc::ptr_eq(&two_before, &two_after));
        // old snapshot untouched
        assert!(one_before.get("happy").unwrap().visible);
        assert!(!one_after.get("happy").unwrap().visible);
    }

    #[test]
    fn no_op_keeps_snapshot_identity() {
        let store = LegendStore::new();
        store.init_legend("one", &descriptors());
        let before = store.get_legend("one").unwrap();
        store.toggle_visibility("one", "missing");
        store.update_color("one", "missing", "#000000");
        store.init_legend("one", &[]);
        assert!(Arc::ptr_eq(&before, &store.get_legend("one").unwrap()));
    }
}
