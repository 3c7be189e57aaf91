use crate::models::Dataset;
use crate::scale::field_extent;
use serde::{Deserialize, Serialize};

/// Extrema of one value column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSummary {
    pub field: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Count, missing cells, min and max for every value column, in header order.
pub fn field_summaries(data: &Dataset) -> Vec<FieldSummary> {
    data.columns
        .iter()
        .map(|field| {
            let count = data
                .records
                .iter()
                .filter(|r| r.value(field).is_some())
                .count();
            let extent = field_extent(&data.records, field);
            FieldSummary {
                field: field.clone(),
                count,
                missing: data.records.len() - count,
                min: extent.map(|e| e.min),
                max: extent.map(|e| e.max),
            }
        })
        .collect()
}
