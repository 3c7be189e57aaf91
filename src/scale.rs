//! Linear scales and the padded domains used by the scatterplot.

use crate::config::{MissingValuePolicy, PlotArea};
use crate::error::{Error, Result};
use crate::models::{FieldSelection, Record, RecordId};

/// Downward padding of the x domain minimum.
pub const X_MIN_PAD: f64 = 0.85;
/// Upward padding of the x domain maximum.
pub const X_MAX_PAD: f64 = 1.05;
/// Downward padding of the y domain minimum.
pub const Y_MIN_PAD: f64 = 0.90;
/// Upward padding of the y domain maximum.
pub const Y_MAX_PAD: f64 = 1.05;

/// Continuous linear map from a value domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a value to a pixel. A degenerate domain maps everything to the range midpoint.
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (v - d0) / span };
        r0 + (r1 - r0) * t
    }

    /// Map a pixel back to a value.
    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        let t = if span == 0.0 { 0.5 } else { (px - r0) / span };
        d0 + (d1 - d0) * t
    }

    /// Round tick values inside the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }

    /// Distance between consecutive ticks for `count`.
    pub fn tick_step(&self, count: usize) -> f64 {
        let (a, b) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        match tick_increment(a, b, count as f64) {
            Some((_, _, inc)) if inc < 0.0 => 1.0 / -inc,
            Some((_, _, inc)) => inc,
            None => 0.0,
        }
    }
}

/// Tick index bounds and increment; a negative increment encodes `1 / -inc`
/// so fractional steps stay exact.
fn tick_increment(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    if !(count > 0.0) {
        return None;
    }
    let step = (stop - start) / count;
    if !step.is_finite() || step == 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let (i1, i2, inc) = if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * inc).round() as i64;
        let mut i2 = (stop * inc).round() as i64;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        (i1, i2, -inc)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round() as i64;
        let mut i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        (i1, i2, inc)
    };

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_increment(start, stop, count * 2.0);
    }
    if !inc.is_finite() || inc == 0.0 {
        return None;
    }
    Some((i1, i2, inc))
}

fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (a, b) = if reverse { (stop, start) } else { (start, stop) };
    let Some((i1, i2, inc)) = tick_increment(a, b, count as f64) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }
    let value = |i: i64| {
        if inc < 0.0 {
            i as f64 / -inc
        } else {
            i as f64 * inc
        }
    };
    let mut out: Vec<f64> = (i1..=i2).map(value).collect();
    if reverse {
        out.reverse();
    }
    out
}

/// Observed extrema of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

/// Scales for one render, plus the records that can be plotted with them.
#[derive(Debug, Clone, PartialEq)]
pub struct Scales {
    pub x: LinearScale,
    pub y: LinearScale,
    /// Records with numeric values for both selected fields, in data order.
    pub plotted: Vec<RecordId>,
    /// Records left out because a selected value was missing.
    pub excluded: Vec<RecordId>,
}

/// Min and max of `field` over records where it is numeric.
pub fn field_extent<'a, I>(records: I, field: &str) -> Option<Extent>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out: Option<Extent> = None;
    for v in records.into_iter().filter_map(|r| r.value(field)) {
        out = Some(match out {
            Some(e) => Extent {
                min: e.min.min(v),
                max: e.max.max(v),
            },
            None => Extent { min: v, max: v },
        });
    }
    out
}

/// Build the x and y scales from the current data and selection.
///
/// x maps `[min*0.85, max*1.05]` to `[0, width]`; y maps `[min*0.90, max*1.05]`
/// to `[height, 0]` so larger values sit higher.
pub fn build_scales(
    records: &[Record],
    selection: &FieldSelection,
    plot: PlotArea,
    policy: MissingValuePolicy,
) -> Result<Scales> {
    if records.is_empty() {
        return Err(Error::EmptyDataset);
    }
    for field in [&selection.x_field, &selection.y_field] {
        if !records.iter().any(|r| r.has_field(field)) {
            return Err(Error::UnknownField {
                field: field.clone(),
            });
        }
    }

    let mut plotted = Vec::with_capacity(records.len());
    let mut excluded = Vec::new();
    for r in records {
        let x = r.value(&selection.x_field);
        let y = r.value(&selection.y_field);
        match (x, y, policy) {
            (Some(_), Some(_), _) => plotted.push(r.id),
            (_, _, MissingValuePolicy::Exclude) => excluded.push(r.id),
            (None, _, MissingValuePolicy::Fail) => {
                return Err(Error::NonNumericValue {
                    field: selection.x_field.clone(),
                    row: r.id.0,
                });
            }
            (_, None, MissingValuePolicy::Fail) => {
                return Err(Error::NonNumericValue {
                    field: selection.y_field.clone(),
                    row: r.id.0,
                });
            }
        }
    }
    if !excluded.is_empty() {
        log::warn!(
            "{} records lack numeric {} / {} and are left out",
            excluded.len(),
            selection.x_field,
            selection.y_field
        );
    }

    let usable: Vec<&Record> = records
        .iter()
        .filter(|r| r.value(&selection.x_field).is_some() && r.value(&selection.y_field).is_some())
        .collect();
    let no_records = || Error::NoPlottableRecords {
        x_field: selection.x_field.clone(),
        y_field: selection.y_field.clone(),
    };
    let xe = field_extent(usable.iter().copied(), &selection.x_field).ok_or_else(no_records)?;
    let ye = field_extent(usable.iter().copied(), &selection.y_field).ok_or_else(no_records)?;

    Ok(Scales {
        x: LinearScale::new((xe.min * X_MIN_PAD, xe.max * X_MAX_PAD), (0.0, plot.width)),
        y: LinearScale::new((ye.min * Y_MIN_PAD, ye.max * Y_MAX_PAD), (plot.height, 0.0)),
        plotted,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_and_invert_agree() {
        let s = LinearScale::new((85.0, 210.0), (0.0, 680.0));
        assert!((s.apply(85.0)).abs() < 1e-9);
        assert!((s.apply(210.0) - 680.0).abs() < 1e-9);
        assert!((s.invert(s.apply(150.0)) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_domain_maps_to_midpoint() {
        let s = LinearScale::new((0.0, 0.0), (450.0, 0.0));
        assert_eq!(s.apply(0.0), 225.0);
    }

    #[test]
    fn ticks_use_round_steps() {
        let s = LinearScale::new((85.0, 210.0), (0.0, 680.0));
        assert_eq!(s.ticks(5), vec![100.0, 120.0, 140.0, 160.0, 180.0, 200.0]);
        assert_eq!(s.tick_step(5), 20.0);
        let f = LinearScale::new((0.0, 1.0), (0.0, 1.0));
        assert_eq!(f.ticks(5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    }
}
