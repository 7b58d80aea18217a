//! Merging a freshly built job set into the previously held one

use serde::Serialize;

use crate::models::{JobId, JobSet};

/// What a reconciliation changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Identifiers only present in the fresh set
    pub added: Vec<JobId>,

    /// Identifiers present in both sets with a different value
    pub updated: Vec<JobId>,

    /// Identifiers only present in the previous set
    pub removed: Vec<JobId>,

    /// Identifiers present in both sets with an equal value
    pub unchanged: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Merge `fresh` into `previous` with add/update/drop semantics.
///
/// The result always has exactly the keys and values of `fresh`; the report
/// tells which entries were added, updated or dropped on the way.
pub fn reconcile(mut previous: JobSet, mut fresh: JobSet) -> (JobSet, ReconcileReport) {
    let mut report = ReconcileReport::default();

    previous.retain(|id, _| {
        let keep = fresh.contains_key(id);
        if !keep {
            report.removed.push(*id);
        }
        keep
    });

    for (id, current) in previous.iter_mut() {
        if let Some(next) = fresh.remove(id) {
            if *current == next {
                report.unchanged += 1;
            } else {
                *current = next;
                report.updated.push(*id);
            }
        }
    }

    for (id, job) in fresh {
        report.added.push(id);
        previous.insert(id, job);
    }

    report.added.sort_unstable();
    report.updated.sort_unstable();
    report.removed.sort_unstable();

    (previous, report)
}
