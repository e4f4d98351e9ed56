pub mod json;
pub mod table;

use serde::Serialize;

use crate::aggregate::inventory_value;
use crate::model::Snapshot;

/// One line of the snapshot history listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub id: i64,
    pub captured_at: chrono::DateTime<chrono::Utc>,
    pub articles: usize,
    pub total_units: u64,
    pub sin_grupo: u64,
    pub value: f64,
}

impl HistoryRow {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let resumen = snapshot.resumen();
        HistoryRow {
            id: snapshot.id,
            captured_at: snapshot.captured_at,
            articles: snapshot.articles.len(),
            total_units: resumen.total,
            sin_grupo: resumen.sin_grupo,
            value: inventory_value(&snapshot.articles),
        }
    }
}

/// Print `value` as JSON, or as the text produced by `table`.
pub fn print<T: Serialize>(value: &T, as_json: bool, table: impl FnOnce(&T) -> String) {
    if as_json {
        println!("{}", json::render(value));
    } else {
        print!("{}", table(value));
    }
}

/// Statistics for one snapshot, optionally with one group's detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub snapshot_id: i64,
    pub captured_at: chrono::DateTime<chrono::Utc>,
    pub counts: crate::aggregate::GroupCounts,
    pub inventory_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupView>,
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub label: String,
    pub detail: crate::aggregate::GroupDetail,
}

/// Group totals of two snapshots side by side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub from_id: i64,
    pub from_captured_at: chrono::DateTime<chrono::Utc>,
    pub to_id: i64,
    pub to_captured_at: chrono::DateTime<chrono::Utc>,
    pub comparison: crate::aggregate::ResumenComparison,
}
