use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Identity of a record: its row position in the loaded dataset.
///
/// Marks are joined to records by this id, never by value, so a record keeps
/// its mark across re-renders no matter which fields are plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One dataset row (one district).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Categorical grouping key, drives the mark color.
    pub state: String,
    /// Display label of the mark.
    pub district: String,
    /// Every other column. `None` when the cell was empty or not a number.
    pub values: BTreeMap<String, Option<f64>>,
}

impl Record {
    /// Numeric value of `field`, or `None` if the column is absent or the cell is not numeric.
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied().flatten()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }
}

/// Records held in memory for the whole session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Value column names in header order (grouping and label columns excluded).
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c == field)
    }

    /// Columns holding at least one numeric cell, in header order.
    pub fn numeric_fields(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| self.records.iter().any(|r| r.value(c).is_some()))
            .cloned()
            .collect()
    }

    /// Distinct states in order of first appearance.
    pub fn distinct_states(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.records {
            if !out.iter().any(|s| s == &r.state) {
                out.push(r.state.clone());
            }
        }
        out
    }
}

/// Which plot axis a field is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            other => Err(Error::InvalidChange(other.to_string())),
        }
    }
}

/// The pair of fields currently plotted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSelection {
    pub x_field: String,
    pub y_field: String,
}

impl FieldSelection {
    pub fn new(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self {
            x_field: x_field.into(),
            y_field: y_field.into(),
        }
    }

    pub fn field(&self, axis: Axis) -> &str {
        match axis {
            Axis::X => &self.x_field,
            Axis::Y => &self.y_field,
        }
    }

    /// Overwrite the field of one axis. Returns whether the selection changed.
    pub fn set(&mut self, axis: Axis, field: &str) -> bool {
        let slot = match axis {
            Axis::X => &mut self.x_field,
            Axis::Y => &mut self.y_field,
        };
        if slot == field {
            return false;
        }
        *slot = field.to_string();
        true
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::new("Males", "Females")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: usize, state: &str, males: Option<f64>) -> Record {
        let mut values = BTreeMap::new();
        values.insert("Males".to_string(), males);
        values.insert("Notes".to_string(), None);
        Record {
            id: RecordId(id),
            state: state.into(),
            district: format!("D{id}"),
            values,
        }
    }

    #[test]
    fn distinct_states_keep_first_seen_order() {
        let ds = Dataset {
            columns: vec!["Males".into(), "Notes".into()],
            records: vec![rec(0, "Kerala", Some(1.0)), rec(1, "Bihar", None), rec(2, "Kerala", None)],
        };
        assert_eq!(ds.distinct_states(), vec!["Kerala", "Bihar"]);
        assert_eq!(ds.numeric_fields(), vec!["Males"]);
    }

    #[test]
    fn selection_set_reports_change() {
        let mut sel = FieldSelection::default();
        assert!(!sel.set(Axis::X, "Males"));
        assert!(sel.set(Axis::Y, "Males"));
        assert_eq!(sel.field(Axis::Y), "Males");
    }

    #[test]
    fn axis_parses_case_insensitively() {
        assert_eq!("X".parse::<Axis>().unwrap(), Axis::X);
        assert!("z".parse::<Axis>().is_err());
    }
}
