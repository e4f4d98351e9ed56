//! Incremental change detection.
//!
//! Compares the current reading against the last observed one (code -> units):
//! - New codes are additions, vanished codes are removals
//! - A drop in units is a reduction, reported as a likely sale
//! - Equal counts and restocks produce no event
//!
//! Works on the lightweight observed state, not on stored snapshots, so it
//! runs on every reading whether or not a snapshot gets saved.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::ObservedState;

/// How a single code moved between two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Added,
    Removed,
    Reduced,
    Unchanged,
    Restocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reduction {
    pub code: String,
    pub before: u64,
    pub after: u64,
}

impl Reduction {
    pub fn units(&self) -> u64 {
        self.before - self.after
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    /// In code order
    pub reduced: Vec<Reduction>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.reduced.is_empty()
    }
}

/// Classify one code given its count now and in the previous reading.
pub fn classify(now: Option<u64>, previous: Option<u64>) -> Option<ChangeKind> {
    match (now, previous) {
        (Some(_), None) => Some(ChangeKind::Added),
        (None, Some(_)) => Some(ChangeKind::Removed),
        (Some(n), Some(p)) if n < p => Some(ChangeKind::Reduced),
        (Some(n), Some(p)) if n > p => Some(ChangeKind::Restocked),
        (Some(_), Some(_)) => Some(ChangeKind::Unchanged),
        (None, None) => None,
    }
}

/// Compare the current reading against the previous one.
pub fn diff(now: &ObservedState, previous: &ObservedState) -> DiffResult {
    let mut result = DiffResult::default();

    for (code, &after) in now {
        match previous.get(code) {
            None => {
                result.added.insert(code.clone());
            }
            Some(&before) if after < before => {
                result.reduced.push(Reduction {
                    code: code.clone(),
                    before,
                    after,
                });
            }
            Some(_) => {}
        }
    }

    for code in previous.keys() {
        if !now.contains_key(code) {
            result.removed.insert(code.clone());
        }
    }

    log::debug!(
        "diff: {} added, {} removed, {} reduced",
        result.added.len(),
        result.removed.len(),
        result.reduced.len()
    );

    result
}
