//! census_scatter
//!
//! An animated scatterplot of tabular census data. Two numeric columns map to
//! screen coordinates, circles are colored by state, and the marks glide to
//! their new places when the plotted columns change. Pairs with the
//! `census-scatter` CLI and the `census-scatter-gui` viewer.
//!
//! ### Features
//! - Load a CSV dataset from a file or an `http(s)` URL
//! - Padded linear scales, d3-style ticks and SI tick labels
//! - Keyed enter/update reconciliation with staggered, retargetable transitions
//! - Draw frames to SVG/PNG, frame sequences or an animated GIF
//! - Export mark geometry as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use census_scatter::{Chart, ChartConfig, DataSource, FieldSelection, LoadOptions};
//!
//! let source: DataSource = "census.csv".parse()?;
//! let data = census_scatter::loader::load(&source, &LoadOptions::default())?;
//! let mut chart = Chart::new(data, ChartConfig::default())?;
//! chart.render(&FieldSelection::new("Males", "Females"), 0.0)?;
//! let frame = chart.frame(chart.settled_at());
//! census_scatter::viz::save_frame(&frame, "census.svg")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod axis;
pub mod color;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod models;
pub mod reconcile;
pub mod render;
pub mod scale;
pub mod selection;
pub mod stats;
pub mod storage;
pub mod timeline;
pub mod transition;
pub mod viz;

pub use config::{ChartConfig, MissingValuePolicy};
pub use error::{Error, Result};
pub use loader::{DataSource, LoadOptions};
pub use models::{Axis, Dataset, FieldSelection, Record, RecordId};
pub use render::{Chart, Frame, RenderOutcome};
pub use selection::{ScheduledChange, SelectionController, fit_selection};
pub use timeline::Timeline;
