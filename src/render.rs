//! The render/update cycle: scales, axes and keyed mark reconciliation.
//!
//! A [`Chart`] owns the session's dataset, the color scale (built once per
//! dataset) and one [`Mark`] per plotted record. Each call to
//! [`Chart::render`] recomputes scales and axes for the given selection and
//! schedules every mark toward its new position:
//!
//! - entering marks appear at the bottom of the plot under their target x and
//!   rise into place,
//! - existing marks move from wherever they currently are,
//! - marks whose record can no longer be plotted fade out and are dropped by
//!   [`Chart::prune`].
//!
//! Each move starts after a delay proportional to its target x, which gives
//! the left-to-right cascade. Nothing blocks: a render may arrive while marks
//! are still moving and simply retargets them.

use crate::axis::{AxisModel, Orientation, render_axis};
use crate::color::{ColorScale, Rgb};
use crate::config::{ChartConfig, Margin};
use crate::error::{Error, Result};
use crate::format::TickFormat;
use crate::models::{Dataset, FieldSelection, Record, RecordId};
use crate::reconcile::reconcile;
use crate::scale::{Scales, build_scales};
use crate::transition::{Easing, MarkState, Motion};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

/// One circle bound to one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub id: RecordId,
    pub label: String,
    pub group: String,
    pub color: Rgb,
    pub radius: f64,
    /// Start delay of the most recently scheduled move.
    pub delay_ms: f64,
    motion: Motion,
    exiting: bool,
}

impl Mark {
    pub fn state_at(&self, t: f64) -> MarkState {
        self.motion.state_at(t)
    }

    pub fn target(&self) -> MarkState {
        self.motion.target()
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    fn retarget(&mut self, now: f64, delay_ms: f64, duration_ms: f64, to: MarkState) {
        let motion = std::mem::replace(&mut self.motion, Motion::Still(to));
        self.motion = motion.retarget(now, delay_ms, duration_ms, to, Easing::CubicInOut);
        self.delay_ms = delay_ms;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderPhase {
    /// First successful render of the chart.
    Initial,
    /// Any later render.
    Update,
}

/// Summary of one render call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutcome {
    pub phase: RenderPhase,
    pub selection: FieldSelection,
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
    /// Records skipped because a selected value was missing.
    pub excluded: usize,
}

/// A mark sampled at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkFrame {
    pub id: RecordId,
    pub label: String,
    pub group: String,
    pub color: Rgb,
    pub radius: f64,
    #[serde(flatten)]
    pub state: MarkState,
}

/// Everything needed to draw the chart at one instant, in plot coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub time_ms: f64,
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
    pub x_axis: Option<AxisModel>,
    pub y_axis: Option<AxisModel>,
    /// Visible marks in record order.
    pub marks: Vec<MarkFrame>,
}

pub struct Chart {
    config: ChartConfig,
    data: Dataset,
    colors: ColorScale,
    x_format: TickFormat,
    y_format: TickFormat,
    marks: AHashMap<RecordId, Mark>,
    scales: Option<Scales>,
    x_axis: Option<AxisModel>,
    y_axis: Option<AxisModel>,
    renders: usize,
}

impl Chart {
    /// Set up a chart over a loaded dataset. Nothing is scheduled until the first render.
    pub fn new(data: Dataset, config: ChartConfig) -> Result<Self> {
        config.validate()?;
        if data.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let x_format = config.x_axis.tick_format()?;
        let y_format = config.y_axis.tick_format()?;
        let colors = ColorScale::from_records(&data.records);
        log::debug!("color scale over {} groups", colors.domain().len());
        Ok(Self {
            config,
            data,
            colors,
            x_format,
            y_format,
            marks: AHashMap::new(),
            scales: None,
            x_axis: None,
            y_axis: None,
            renders: 0,
        })
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn colors(&self) -> &ColorScale {
        &self.colors
    }

    pub fn scales(&self) -> Option<&Scales> {
        self.scales.as_ref()
    }

    pub fn x_axis(&self) -> Option<&AxisModel> {
        self.x_axis.as_ref()
    }

    pub fn y_axis(&self) -> Option<&AxisModel> {
        self.y_axis.as_ref()
    }

    pub fn mark(&self, id: RecordId) -> Option<&Mark> {
        self.marks.get(&id)
    }

    /// All marks, exiting ones included, in record order.
    pub fn marks(&self) -> Vec<&Mark> {
        let mut out: Vec<&Mark> = self.marks.values().collect();
        out.sort_by_key(|m| m.id);
        out
    }

    /// Recompute scales and axes for `selection` and schedule every mark toward
    /// its new position. On error the chart is left as it was.
    pub fn render(&mut self, selection: &FieldSelection, now_ms: f64) -> Result<RenderOutcome> {
        let plot = self.config.plot_area();
        let scales = build_scales(
            &self.data.records,
            selection,
            plot,
            self.config.missing_values,
        )?;

        let x_axis = render_axis(
            &scales.x,
            Orientation::Bottom,
            self.config.x_axis.ticks,
            &self.x_format,
            self.config.field_label(&selection.x_field),
        );
        let y_axis = render_axis(
            &scales.y,
            Orientation::Left,
            self.config.y_axis.ticks,
            &self.y_format,
            self.config.field_label(&selection.y_field),
        );

        let plotted: AHashSet<RecordId> = scales.plotted.iter().copied().collect();
        let rows: Vec<&Record> = self
            .data
            .records
            .iter()
            .filter(|r| plotted.contains(&r.id))
            .collect();
        let join = reconcile(&self.marks, rows.iter().copied());

        let duration = self.config.transition.duration_ms;
        let per_px = self.config.transition.delay_per_px;
        let opacity = self.config.mark.opacity;
        let target_of = |r: &Record| -> Option<MarkState> {
            let x = r.value(&selection.x_field)?;
            let y = r.value(&selection.y_field)?;
            Some(MarkState {
                x: scales.x.apply(x),
                y: scales.y.apply(y),
                opacity,
            })
        };

        let mut entered = 0;
        for r in &join.enter {
            let Some(to) = target_of(r) else { continue };
            let from = MarkState {
                y: plot.height,
                ..to
            };
            let mut mark = Mark {
                id: r.id,
                label: r.district.clone(),
                group: r.state.clone(),
                color: self.colors.color(&r.state),
                radius: self.config.mark.radius,
                delay_ms: 0.0,
                motion: Motion::Still(from),
                exiting: false,
            };
            mark.retarget(now_ms, to.x * per_px, duration, to);
            self.marks.insert(r.id, mark);
            entered += 1;
        }

        let mut updated = 0;
        for r in &join.update {
            let Some(to) = target_of(r) else { continue };
            if let Some(mark) = self.marks.get_mut(&r.id) {
                mark.label = r.district.clone();
                mark.group = r.state.clone();
                mark.color = self.colors.color(&r.state);
                mark.radius = self.config.mark.radius;
                mark.exiting = false;
                mark.retarget(now_ms, to.x * per_px, duration, to);
                updated += 1;
            }
        }

        let mut exited = 0;
        for id in &join.exit {
            if let Some(mark) = self.marks.get_mut(id)
                && !mark.exiting
            {
                let to = MarkState {
                    opacity: 0.0,
                    ..mark.target()
                };
                mark.exiting = true;
                mark.retarget(now_ms, 0.0, duration, to);
                exited += 1;
            }
        }

        let phase = if self.renders == 0 {
            RenderPhase::Initial
        } else {
            RenderPhase::Update
        };
        self.renders += 1;
        let outcome = RenderOutcome {
            phase,
            selection: selection.clone(),
            entered,
            updated,
            exited,
            excluded: scales.excluded.len(),
        };
        log::info!(
            "{:?} render of {} vs {} at {:.0} ms: {} entered, {} updated, {} exiting",
            phase,
            selection.x_field,
            selection.y_field,
            now_ms,
            entered,
            updated,
            exited
        );

        self.scales = Some(scales);
        self.x_axis = Some(x_axis);
        self.y_axis = Some(y_axis);
        Ok(outcome)
    }

    /// Snapshot of axes and visible marks at `t`.
    pub fn frame(&self, t: f64) -> Frame {
        let marks = self
            .marks()
            .into_iter()
            .map(|m| MarkFrame {
                id: m.id,
                label: m.label.clone(),
                group: m.group.clone(),
                color: m.color,
                radius: m.radius,
                state: m.state_at(t),
            })
            .filter(|m| m.state.opacity > 0.0)
            .collect();
        Frame {
            time_ms: t,
            width: self.config.width,
            height: self.config.height,
            margin: self.config.margin,
            x_axis: self.x_axis.clone(),
            y_axis: self.y_axis.clone(),
            marks,
        }
    }

    /// Number of successful renders so far.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn is_animating(&self, t: f64) -> bool {
        self.marks.values().any(|m| m.motion.is_moving(t))
    }

    /// Time at which every scheduled move has finished (0 when nothing was scheduled).
    pub fn settled_at(&self) -> f64 {
        self.marks
            .values()
            .map(|m| m.motion.settles_at())
            .fold(0.0, f64::max)
    }

    /// Drop marks that have finished fading out. Returns how many were removed.
    pub fn prune(&mut self, t: f64) -> usize {
        let before = self.marks.len();
        self.marks
            .retain(|_, m| !(m.exiting && !m.motion.is_moving(t)));
        before - self.marks.len()
    }

    /// Swap in a new dataset. Colors are rebuilt for it; marks are matched to the
    /// new records by id on the next render.
    pub fn replace_dataset(&mut self, data: Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(Error::EmptyDataset);
        }
        self.colors = ColorScale::from_records(&data.records);
        self.data = data;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn rec(id: usize, state: &str, males: f64, females: f64) -> Record {
        let mut values = BTreeMap::new();
        values.insert("Males".to_string(), Some(males));
        values.insert("Females".to_string(), Some(females));
        Record {
            id: RecordId(id),
            state: state.into(),
            district: format!("D{}", id + 1),
            values,
        }
    }

    fn chart() -> Chart {
        let data = Dataset {
            columns: vec!["Males".into(), "Females".into()],
            records: vec![rec(0, "A", 100.0, 90.0), rec(1, "A", 200.0, 150.0)],
        };
        Chart::new(data, ChartConfig::default()).unwrap()
    }

    #[test]
    fn entering_marks_start_at_the_bottom() {
        let mut c = chart();
        let out = c.render(&FieldSelection::default(), 0.0).unwrap();
        assert_eq!(out.phase, RenderPhase::Initial);
        assert_eq!(out.entered, 2);
        let m = c.mark(RecordId(1)).unwrap();
        let start = m.state_at(0.0);
        assert_eq!(start.y, 450.0);
        assert!((start.x - m.target().x).abs() < 1e-9);
        assert_eq!(start.opacity, 0.3);
    }

    #[test]
    fn second_render_is_an_update() {
        let mut c = chart();
        c.render(&FieldSelection::default(), 0.0).unwrap();
        let out = c
            .render(&FieldSelection::new("Females", "Males"), 100.0)
            .unwrap();
        assert_eq!(out.phase, RenderPhase::Update);
        assert_eq!((out.entered, out.updated, out.exited), (0, 2, 0));
    }

    #[test]
    fn failed_render_leaves_state_alone() {
        let mut c = chart();
        c.render(&FieldSelection::default(), 0.0).unwrap();
        let before = c.x_axis().cloned();
        let err = c.render(&FieldSelection::new("Nope", "Males"), 10.0);
        assert!(matches!(err, Err(Error::UnknownField { .. })));
        assert_eq!(c.x_axis().cloned(), before);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let r = Chart::new(Dataset::default(), ChartConfig::default());
        assert!(matches!(r, Err(Error::EmptyDataset)));
    }
}
