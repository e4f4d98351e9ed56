use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};

use stocktake::capture::capture_at;
use stocktake::error::RangeError;
use stocktake::model::{Article, ObservedState, Resumen};
use stocktake::reconcile::{reconcile, reconcile_ids};
use stocktake::source::Inventory;
use stocktake::store::diff::diff;
use stocktake::store::{SnapshotStore, SqliteStorage};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_720_000_000 + secs, 0).unwrap()
}

fn open(dir: &tempfile::TempDir) -> SnapshotStore<SqliteStorage> {
    let storage = SqliteStorage::open(&dir.path().join("nested").join("stocktake.db")).unwrap();
    SnapshotStore::new(storage)
}

fn inventory(articles: Vec<Article>) -> Inventory {
    let resumen = Resumen::tally(&articles);
    Inventory { articles, resumen }
}

#[test]
fn dedup_keeps_first_and_changed_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(&dir);

    let s1 = vec![Article::new("A", 5, 1.0), Article::new("B", 3, 1.0)];
    let s2 = vec![Article::new("A", 4, 1.0), Article::new("B", 3, 1.0)];

    assert!(store.append_at(s1.clone(), at(0)).unwrap().stored());
    assert!(!store.append_at(s1.clone(), at(1)).unwrap().stored());
    assert!(store.append_at(s2.clone(), at(2)).unwrap().stored());

    let history = store.all();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].articles, s1);
    assert_eq!(history[1].articles, s2);
}

#[test]
fn history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = open(&dir);
        store
            .append_at(vec![Article::new("A1", 10, 2.0).with_group("X")], at(0))
            .unwrap();
        store
            .append_at(vec![Article::new("A1", 4, 2.0).with_group("X")], at(60))
            .unwrap();
    }

    let store = open(&dir);
    let history = store.all();
    assert_eq!(history.len(), 2);
    assert!(history[0].captured_at <= history[1].captured_at);

    let result = reconcile_ids(&history, history[0].id, history[1].id).unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].code, "A1");
    assert_eq!(result.rows[0].units_sold, 6);
    assert_eq!(result.rows[0].revenue, 12.0);
}

#[test]
fn reconcile_rejects_ids_outside_history() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(&dir);
    let id = store
        .append_at(vec![Article::new("A", 1, 1.0)], at(0))
        .unwrap()
        .snapshot()
        .unwrap()
        .id;

    let err = reconcile_ids(&store.all(), id, id + 1000).unwrap_err();
    assert_eq!(err, RangeError::UnknownSnapshot { id: id + 1000 });
}

#[test]
fn capture_flow_diffs_against_last_reading() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(&dir);

    capture_at(
        &mut store,
        inventory(vec![Article::new("A", 3, 1.0), Article::new("C", 2, 1.0)]),
        at(0),
    )
    .unwrap();

    let report = capture_at(
        &mut store,
        inventory(vec![Article::new("A", 3, 1.0), Article::new("B", 5, 1.0)]),
        at(10),
    )
    .unwrap();

    let expect = |codes: &[&str]| codes.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>();
    assert_eq!(report.diff.added, expect(&["B"]));
    assert_eq!(report.diff.removed, expect(&["C"]));
    assert!(report.diff.reduced.is_empty());
    assert!(report.stored);

    let observed: ObservedState = store.load_last_observed();
    assert_eq!(observed.keys().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn corrupt_database_contents_read_as_empty() {
    use stocktake::store::{KvStorage, HISTORY_KEY};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stocktake.db");
    {
        let mut storage = SqliteStorage::open(&path).unwrap();
        storage.set(HISTORY_KEY, "[{\"id\": \"oops\"}]").unwrap();
    }

    let mut store = SnapshotStore::new(SqliteStorage::open(&path).unwrap());
    assert!(store.all().is_empty());
    assert!(store.append_at(vec![Article::new("A", 1, 1.0)], at(0)).unwrap().stored());
    assert_eq!(store.all().len(), 1);
}

#[test]
fn scenario_reconciliations() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(&dir);

    store.append_at(vec![Article::new("A1", 5, 1.0)], at(0)).unwrap();
    store.append_at(vec![Article::new("A1", 5, 1.0), Article::new("Z", 1, 1.0)], at(1)).unwrap();
    store.append_at(vec![], at(2)).unwrap();
    let history = store.all();
    assert_eq!(history.len(), 3);

    let unchanged = reconcile(&history[0], &history[1]);
    assert!(unchanged.rows.is_empty());
    assert_eq!(unchanged.summary.total_units, 0);

    let removed = reconcile(&history[0], &history[2]);
    assert!(removed.rows.is_empty());

    let now: ObservedState = [("A".to_string(), 3), ("B".to_string(), 5)].into_iter().collect();
    let previous: ObservedState = [("A".to_string(), 3), ("C".to_string(), 2)].into_iter().collect();
    let result = diff(&now, &previous);
    assert!(result.added.contains("B") && result.removed.contains("C"));
    assert!(result.reduced.is_empty());
}
