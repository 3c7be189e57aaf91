//! Drive a chart through simulated time and sample frames at a fixed rate.

use crate::error::{Error, Result};
use crate::models::FieldSelection;
use crate::render::{Chart, Frame};
use crate::selection::{ScheduledChange, SelectionController};

/// Upper bound on frames per run, so a runaway schedule cannot exhaust memory.
pub const MAX_FRAMES: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub fps: u32,
    /// Changes applied in time order; several at the same instant apply in list order.
    pub changes: Vec<ScheduledChange>,
}

impl Timeline {
    pub fn new(fps: u32, mut changes: Vec<ScheduledChange>) -> Self {
        changes.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Self {
            fps: fps.max(1),
            changes,
        }
    }

    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps as f64
    }

    /// Time of the last frame a run may sample.
    pub fn limit_ms(&self) -> f64 {
        (MAX_FRAMES - 1) as f64 * self.frame_interval_ms()
    }

    /// Render `initial` at t = 0 (unless the chart was already rendered), apply each
    /// scheduled change at its time, and sample a frame every interval until the
    /// last change has settled.
    ///
    /// Fails before rendering anything when a change lies past [`Timeline::limit_ms`].
    pub fn run(
        &self,
        chart: &mut Chart,
        controller: &mut SelectionController,
        initial: &FieldSelection,
    ) -> Result<Vec<Frame>> {
        let dt = self.frame_interval_ms();
        let last_change = self.changes.last().map(|c| c.at_ms).unwrap_or(0.0);
        let limit_ms = self.limit_ms();
        if last_change > limit_ms {
            return Err(Error::ScheduleTooLong {
                at_ms: last_change,
                limit_ms,
            });
        }
        if chart.render_count() == 0 {
            chart.render(initial, 0.0)?;
        }
        let mut pending = self.changes.iter().peekable();
        let mut frames = Vec::new();
        let mut i = 0usize;
        loop {
            let t = i as f64 * dt;
            while let Some(c) = pending.next_if(|c| c.at_ms <= t) {
                controller.apply(c.axis, &c.field, chart, c.at_ms)?;
            }
            chart.prune(t);
            frames.push(chart.frame(t));
            i += 1;
            let done = t >= last_change && !chart.is_animating(t);
            if done {
                break;
            }
            if frames.len() >= MAX_FRAMES {
                log::warn!("stopped at {} frames while marks were still moving", MAX_FRAMES);
                break;
            }
        }
        log::info!("sampled {} frames at {} fps", frames.len(), self.fps);
        Ok(frames)
    }
}
