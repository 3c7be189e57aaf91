//! Keyed enter/update/exit diff between records and existing visual handles.

use crate::models::{Record, RecordId};
use ahash::{AHashMap, AHashSet};

/// Outcome of joining data against existing handles by record identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Join<'a> {
    /// Records without a handle yet, in data order.
    pub enter: Vec<&'a Record>,
    /// Records whose handle already exists, in data order.
    pub update: Vec<&'a Record>,
    /// Handles whose record is no longer present, sorted by id.
    pub exit: Vec<RecordId>,
}

/// Classify each record as new or existing and list handles left without a record.
///
/// The handle type is opaque here; only its key matters.
pub fn reconcile<'a, H, I>(existing: &AHashMap<RecordId, H>, data: I) -> Join<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut enter = Vec::new();
    let mut update = Vec::new();
    let mut seen: AHashSet<RecordId> = AHashSet::new();
    for r in data {
        if !seen.insert(r.id) {
            continue;
        }
        if existing.contains_key(&r.id) {
            update.push(r);
        } else {
            enter.push(r);
        }
    }
    let mut exit: Vec<RecordId> = existing
        .keys()
        .filter(|id| !seen.contains(id))
        .copied()
        .collect();
    exit.sort();
    Join {
        enter,
        update,
        exit,
    }
}
