//! Axis models derived from a scale: tick values, pixel positions and labels.

use crate::format::TickFormat;
use crate::scale::LinearScale;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Horizontal axis under the plot, labels below the ticks.
    Bottom,
    /// Vertical axis left of the plot, labels left of the ticks.
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    /// Offset along the axis in plot pixels.
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisModel {
    pub orientation: Orientation,
    /// Pixel extent of the axis line.
    pub range: (f64, f64),
    pub title: String,
    pub ticks: Vec<Tick>,
}

/// Project a scale into drawable ticks. Recomputed on every render.
pub fn render_axis(
    scale: &LinearScale,
    orientation: Orientation,
    tick_count: usize,
    format: &TickFormat,
    title: impl Into<String>,
) -> AxisModel {
    let (d0, d1) = scale.domain();
    let fmt = format.for_ticks(d0, d1, scale.tick_step(tick_count));
    let ticks = scale
        .ticks(tick_count)
        .into_iter()
        .map(|value| Tick {
            value,
            position: scale.apply(value),
            label: fmt.format(value),
        })
        .collect();
    AxisModel {
        orientation,
        range: scale.range(),
        title: title.into(),
        ticks,
    }
}
