//! One observation of the inventory.
//!
//! Diffs the reading against the last observed state, overwrites that state,
//! then appends a snapshot unless nothing changed since the latest one.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::model::{observe, Resumen};
use crate::source::Inventory;
use crate::store::diff::{self, DiffResult};
use crate::store::{AppendOutcome, KvStorage, SnapshotStore};

#[derive(Debug, Serialize)]
pub struct CaptureReport {
    pub diff: DiffResult,
    pub stored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<i64>,
    /// The source's summary as supplied. Only articles are stored, so later
    /// views tally their own.
    pub resumen: Resumen,
}

pub fn capture<S: KvStorage>(
    store: &mut SnapshotStore<S>,
    inventory: Inventory,
) -> Result<CaptureReport, StoreError> {
    capture_at(store, inventory, Utc::now())
}

pub fn capture_at<S: KvStorage>(
    store: &mut SnapshotStore<S>,
    inventory: Inventory,
    now: DateTime<Utc>,
) -> Result<CaptureReport, StoreError> {
    let Inventory { articles, resumen } = inventory;

    let observed = observe(&articles);
    let previous = store.load_last_observed();
    let diff = diff::diff(&observed, &previous);
    store.save_last_observed(&observed)?;

    let outcome = store.append_at(articles, now)?;
    let snapshot_id = match &outcome {
        AppendOutcome::Stored(snapshot) => Some(snapshot.id),
        AppendOutcome::Unchanged => None,
    };

    Ok(CaptureReport {
        diff,
        stored: outcome.stored(),
        snapshot_id,
        resumen,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Article;
    use crate::store::MemoryStorage;
    use chrono::TimeZone;

    fn inventory(articles: Vec<Article>) -> Inventory {
        let resumen = Resumen::tally(&articles);
        Inventory { articles, resumen }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn last_observed_updated_even_when_unchanged() {
        let mut store = SnapshotStore::new(MemoryStorage::new());
        let first = capture_at(&mut store, inventory(vec![Article::new("A", 3, 1.0)]), at(0)).unwrap();
        assert!(first.stored);
        assert_eq!(first.diff.added.len(), 1);

        let second = capture_at(&mut store, inventory(vec![Article::new("A", 3, 1.0)]), at(1)).unwrap();
        assert!(!second.stored);
        assert!(second.snapshot_id.is_none());
        assert!(second.diff.is_empty());
        assert_eq!(store.load_last_observed().get("A"), Some(&3));
    }

    #[test]
    fn supplied_resumen_reported_but_not_stored() {
        let mut store = SnapshotStore::new(MemoryStorage::new());
        let articles = vec![Article::new("A", 3, 1.0).with_group("X")];
        let supplied = Resumen {
            total: 10,
            por_grupo: vec![("X".to_string(), 3), ("Y".to_string(), 7)],
            sin_grupo: 0,
        };

        let report = capture_at(
            &mut store,
            Inventory { articles, resumen: supplied.clone() },
            at(0),
        )
        .unwrap();
        assert_eq!(report.resumen, supplied);

        let stored = store.latest().unwrap().resumen();
        assert_eq!(stored.total, 3);
        assert_eq!(stored.count_for("Y"), 0);
    }

    #[test]
    fn diff_uses_last_reading_not_history() {
        let mut store = SnapshotStore::new(MemoryStorage::new());
        capture_at(&mut store, inventory(vec![Article::new("A", 5, 1.0)]), at(0)).unwrap();
        store.clear().unwrap();

        let report = capture_at(&mut store, inventory(vec![Article::new("A", 2, 1.0)]), at(1)).unwrap();
        assert_eq!(report.diff.reduced.len(), 1);
        assert_eq!(report.diff.reduced[0].units(), 3);
        assert!(report.stored);
    }
}
