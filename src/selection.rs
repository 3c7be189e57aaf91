//! Field selection changes coming from the user interface.

use crate::error::{Error, Result};
use crate::models::{Axis, Dataset, FieldSelection};
use crate::render::{Chart, RenderOutcome};
use std::str::FromStr;

/// Sole writer of the current [`FieldSelection`].
///
/// Every change overwrites the previous value (last write wins) and triggers one
/// synchronous render; nothing is queued.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionController {
    selection: FieldSelection,
    fields: Vec<String>,
}

impl SelectionController {
    /// `fields` are the names a change may select, usually [`Dataset::numeric_fields`].
    pub fn new(initial: FieldSelection, fields: Vec<String>) -> Self {
        Self {
            selection: initial,
            fields,
        }
    }

    pub fn for_dataset(initial: FieldSelection, data: &Dataset) -> Self {
        Self::new(initial, data.numeric_fields())
    }

    pub fn selection(&self) -> &FieldSelection {
        &self.selection
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Overwrite the field of `axis`. Returns whether anything changed.
    pub fn change(&mut self, axis: Axis, field: &str) -> Result<bool> {
        if !self.fields.iter().any(|f| f == field) {
            return Err(Error::UnknownField {
                field: field.to_string(),
            });
        }
        Ok(self.selection.set(axis, field))
    }

    /// Apply a change and re-render at `now_ms`.
    ///
    /// The chart is re-rendered even when the selection did not change; marks then
    /// converge to the positions they already had.
    pub fn apply(
        &mut self,
        axis: Axis,
        field: &str,
        chart: &mut Chart,
        now_ms: f64,
    ) -> Result<RenderOutcome> {
        self.change(axis, field)?;
        chart.render(&self.selection, now_ms)
    }
}

/// First candidate whose two fields are both in `fields`, else the first two
/// fields (the same one twice when there is only one).
pub fn fit_selection<'a, I>(candidates: I, fields: &[String]) -> Result<FieldSelection>
where
    I: IntoIterator<Item = &'a FieldSelection>,
{
    let known = |f: &str| fields.iter().any(|k| k == f);
    if let Some(sel) = candidates
        .into_iter()
        .find(|s| known(&s.x_field) && known(&s.y_field))
    {
        return Ok(sel.clone());
    }
    let x = fields.first().ok_or(Error::NoNumericFields)?;
    let y = fields.get(1).unwrap_or(x);
    log::info!("plotting {} vs {}, the configured fields are missing", x, y);
    Ok(FieldSelection::new(x.clone(), y.clone()))
}

/// A change to apply at a given time, written `AT_MS:AXIS=FIELD` (e.g. `2000:x=Females`).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledChange {
    pub at_ms: f64,
    pub axis: Axis,
    pub field: String,
}

impl FromStr for ScheduledChange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidChange(s.to_string());
        let (at, rest) = s.split_once(':').ok_or_else(bad)?;
        let (axis, field) = rest.split_once('=').ok_or_else(bad)?;
        let at_ms = at.trim().parse::<f64>().map_err(|_| bad())?;
        if !at_ms.is_finite() || at_ms < 0.0 {
            return Err(bad());
        }
        let field = field.trim();
        if field.is_empty() {
            return Err(bad());
        }
        Ok(Self {
            at_ms,
            axis: axis.parse().map_err(|_| bad())?,
            field: field.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_are_refused() {
        let mut c = SelectionController::new(
            FieldSelection::default(),
            vec!["Males".into(), "Females".into()],
        );
        assert!(c.change(Axis::X, "Literates").is_err());
        assert_eq!(c.selection(), &FieldSelection::default());
    }

    #[test]
    fn last_write_wins() {
        let mut c = SelectionController::new(
            FieldSelection::default(),
            vec!["Males".into(), "Females".into(), "Persons".into()],
        );
        assert!(c.change(Axis::X, "Persons").unwrap());
        assert!(c.change(Axis::X, "Females").unwrap());
        assert!(!c.change(Axis::X, "Females").unwrap());
        assert_eq!(c.selection().x_field, "Females");
    }

    #[test]
    fn fit_prefers_candidates_then_falls_back() {
        let fields: Vec<String> = vec!["Persons".into(), "Literate".into()];
        let kept = FieldSelection::new("Literate", "Persons");
        assert_eq!(
            fit_selection([&FieldSelection::default(), &kept], &fields).unwrap(),
            kept
        );
        assert_eq!(
            fit_selection([&FieldSelection::default()], &fields).unwrap(),
            FieldSelection::new("Persons", "Literate")
        );
        let single = vec!["Persons".to_string()];
        assert_eq!(
            fit_selection([], &single).unwrap(),
            FieldSelection::new("Persons", "Persons")
        );
        assert!(matches!(
            fit_selection([&kept], &[]),
            Err(Error::NoNumericFields)
        ));
    }

    #[test]
    fn parses_scheduled_changes() {
        let c: ScheduledChange = "2000:x=Females".parse().unwrap();
        assert_eq!(c.at_ms, 2000.0);
        assert_eq!(c.axis, Axis::X);
        assert_eq!(c.field, "Females");
        assert!("x=Females".parse::<ScheduledChange>().is_err());
        assert!("-5:y=Males".parse::<ScheduledChange>().is_err());
        assert!("10:z=Males".parse::<ScheduledChange>().is_err());
    }
}
