//! dashcharts
//!
//! Chart data plumbing for a small analytics dashboard: a shared legend store,
//! per-chart legend bindings, payload normalization, percentage stacking and
//! SVG rendering. Pairs with the `dashcharts` CLI.
//!
//! ### Features
//! - Per-chart legend state (visibility, color overrides) keyed by chart id
//! - Normalizers for brand listings, weekly trends and per-team series
//! - 100% stacked bar/area and dual-axis multi-line charts, rendered to SVG
//! - Posts client with cursor paging and form validation
//!
//! ### Example
//! ```no_run
//! use dashcharts::{Client, LegendStore};
//! use dashcharts::dashboard::{load_dashboard, standard_panels};
//!
//! let client = Client::default();
//! let store = LegendStore::new();
//! for panel in load_dashboard(&client, &standard_panels()) {
//!     if let Some(model) = panel.render_model(&store) {
//!         dashcharts::viz::write_svg(&model, format!("{}.svg", model.chart_id), 800, 480)?;
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod binding;
pub mod dashboard;
pub mod error;
pub mod legend;
pub mod models;
pub mod normalize;
pub mod palette;
pub mod percent;
pub mod posts;
pub mod storage;
pub mod viz;

pub use api::{Client, Endpoint};
pub use binding::{LegendBinding, ResolvedSeries};
pub use error::PostError;
pub use legend::{LegendItem, LegendMap, LegendStore};
pub use models::{FetchState, LineSeries, RawPayload, Row, SeriesDescriptor};
