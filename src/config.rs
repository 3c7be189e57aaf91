//! Chart configuration: surface size, margins, plotted fields, mark style and timing.
//!
//! Every field has a default reproducing the classic 800×600 census chart, so a
//! JSON file only needs the keys it wants to change:
//!
//! ```json
//! { "x_field": "Females", "transition": { "duration_ms": 800 } }
//! ```

use crate::error::{Error, Result};
use crate::format::TickFormat;
use crate::loader::LoadOptions;
use crate::models::FieldSelection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Largest tick count an axis may request.
pub const MAX_TICKS: usize = 100;

/// Space between the surface border and the plot area, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 50.0,
            bottom: 100.0,
            left: 70.0,
        }
    }
}

/// Size of the inner plot area (surface minus margins).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkStyle {
    pub radius: f64,
    pub opacity: f64,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            radius: 10.0,
            opacity: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: f64,
    /// Start delay per pixel of target x, producing a left-to-right cascade.
    pub delay_per_px: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1500.0,
            delay_per_px: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub ticks: usize,
    /// Tick label specifier, see [`TickFormat`].
    pub format: String,
}

impl AxisConfig {
    fn new(ticks: usize, format: &str) -> Self {
        Self {
            ticks,
            format: format.to_string(),
        }
    }

    pub fn tick_format(&self) -> Result<TickFormat> {
        self.format.parse()
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::new(10, ".2s")
    }
}

/// What to do with a record whose plotted field is empty or not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Leave the record out of the extrema and out of the chart.
    #[default]
    Exclude,
    /// Fail the render.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
    /// Column used for coloring.
    pub group_field: String,
    /// Column used as mark label.
    pub label_field: String,
    pub x_field: String,
    pub y_field: String,
    pub mark: MarkStyle,
    pub transition: TransitionConfig,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    /// Display names for fields; unlisted fields are shown with `_` replaced by spaces.
    pub field_labels: BTreeMap<String, String>,
    pub missing_values: MissingValuePolicy,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: Margin::default(),
            group_field: "State".into(),
            label_field: "District".into(),
            x_field: "Males".into(),
            y_field: "Females".into(),
            mark: MarkStyle::default(),
            transition: TransitionConfig::default(),
            x_axis: AxisConfig::new(5, "s"),
            y_axis: AxisConfig::new(10, ".2s"),
            field_labels: BTreeMap::new(),
            missing_values: MissingValuePolicy::Exclude,
        }
    }
}

impl ChartConfig {
    /// Read a JSON config file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: ChartConfig = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `<config_dir>/census-scatter/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("census-scatter").join("config.json"))
    }

    /// Explicit file if given, else the per-user file when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::from_json_file(p);
        }
        match Self::default_path() {
            Some(p) if p.is_file() => {
                log::info!("using config {}", p.display());
                Self::from_json_file(p)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let plot = self.plot_area();
        if !(plot.width > 0.0 && plot.height > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "margins leave no plot area ({}x{})",
                plot.width, plot.height
            )));
        }
        if !(0.0..=1.0).contains(&self.mark.opacity) {
            return Err(Error::InvalidConfig(format!(
                "mark opacity {} outside 0..=1",
                self.mark.opacity
            )));
        }
        if self.mark.radius <= 0.0 {
            return Err(Error::InvalidConfig("mark radius must be positive".into()));
        }
        if self.transition.duration_ms < 0.0 || self.transition.delay_per_px < 0.0 {
            return Err(Error::InvalidConfig(
                "transition timings must not be negative".into(),
            ));
        }
        for (name, axis) in [("x_axis", &self.x_axis), ("y_axis", &self.y_axis)] {
            if axis.ticks > MAX_TICKS {
                return Err(Error::InvalidConfig(format!(
                    "{name}.ticks {} above {MAX_TICKS}",
                    axis.ticks
                )));
            }
        }
        self.x_axis.tick_format()?;
        self.y_axis.tick_format()?;
        Ok(())
    }

    pub fn plot_area(&self) -> PlotArea {
        PlotArea {
            width: self.width as f64 - self.margin.left - self.margin.right,
            height: self.height as f64 - self.margin.top - self.margin.bottom,
        }
    }

    /// Loader settings for the configured group and label columns.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            group_column: self.group_field.clone(),
            label_column: self.label_field.clone(),
        }
    }

    pub fn initial_selection(&self) -> FieldSelection {
        FieldSelection::new(self.x_field.clone(), self.y_field.clone())
    }

    /// Human-readable name of a field for axis titles.
    pub fn field_label(&self, field: &str) -> String {
        self.field_labels
            .get(field)
            .cloned()
            .unwrap_or_else(|| field.replace('_', " "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_680_by_450_plot() {
        let cfg = ChartConfig::default();
        assert_eq!(
            cfg.plot_area(),
            PlotArea {
                width: 680.0,
                height: 450.0
            }
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ChartConfig =
            serde_json::from_str(r#"{"x_field":"Literates","transition":{"duration_ms":800}}"#)
                .unwrap();
        assert_eq!(cfg.x_field, "Literates");
        assert_eq!(cfg.transition.duration_ms, 800.0);
        assert_eq!(cfg.transition.delay_per_px, 5.0);
        assert_eq!(cfg.margin.left, 70.0);
        assert_eq!(cfg.missing_values, MissingValuePolicy::Exclude);
    }

    #[test]
    fn oversized_margins_are_rejected() {
        let mut cfg = ChartConfig::default();
        cfg.margin.left = 900.0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn field_label_falls_back_to_name() {
        let mut cfg = ChartConfig::default();
        cfg.field_labels
            .insert("Males".into(), "Male population".into());
        assert_eq!(cfg.field_label("Males"), "Male population");
        assert_eq!(cfg.field_label("Main_Workers"), "Main Workers");
    }
}
