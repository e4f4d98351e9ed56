//! Sales reconciliation between two stored snapshots.
//!
//! For every code present in both snapshots whose stock went down, the drop
//! is taken as units sold and priced at the start snapshot's price. Codes
//! missing from either side are not sales and are skipped. Rows follow the
//! order of the start snapshot's articles.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RangeError;
use crate::model::{Article, Snapshot};

/// Length of every top-N ranking in a [`SalesSummary`].
pub const TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    pub code: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub unit_price: f64,
    pub stock_start: u64,
    pub stock_end: u64,
    pub units_sold: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSales {
    /// `None` collects every ungrouped row
    pub group: Option<String>,
    pub units_sold: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_units: u64,
    pub total_revenue: f64,
    pub top_groups: Vec<GroupSales>,
    pub top_by_units: Vec<SalesRow>,
    pub top_by_revenue: Vec<SalesRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub start_id: i64,
    pub end_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub rows: Vec<SalesRow>,
    pub summary: SalesSummary,
}

/// Build the sales ledger from `start` to `end`.
///
/// Ordering is not enforced: swapping the arguments measures decreases in the
/// other direction.
pub fn reconcile(start: &Snapshot, end: &Snapshot) -> Reconciliation {
    let rows = sales_rows(&start.articles, &end.articles);
    let summary = summarize(&rows);

    log::debug!(
        "reconciled {} -> {}: {} rows, {} units",
        start.id,
        end.id,
        rows.len(),
        summary.total_units
    );

    Reconciliation {
        start_id: start.id,
        end_id: end.id,
        start_at: start.captured_at,
        end_at: end.captured_at,
        rows,
        summary,
    }
}

/// Reconcile two snapshots picked from `history` by id.
pub fn reconcile_ids(
    history: &[Snapshot],
    start_id: i64,
    end_id: i64,
) -> Result<Reconciliation, RangeError> {
    let start = find(history, start_id)?;
    let end = find(history, end_id)?;
    Ok(reconcile(start, end))
}

pub fn find(history: &[Snapshot], id: i64) -> Result<&Snapshot, RangeError> {
    history
        .iter()
        .find(|s| s.id == id)
        .ok_or(RangeError::UnknownSnapshot { id })
}

/// The two most recent snapshots, as (previous, latest).
pub fn latest_pair(history: &[Snapshot]) -> Result<(&Snapshot, &Snapshot), RangeError> {
    match history {
        [.., previous, latest] => Ok((previous, latest)),
        _ => Err(RangeError::NotEnoughHistory {
            have: history.len(),
        }),
    }
}

/// Oldest snapshot captured within `window` before `now`, paired with the newest one.
pub fn select_window(
    history: &[Snapshot],
    now: DateTime<Utc>,
    window: Duration,
) -> Result<(&Snapshot, &Snapshot), RangeError> {
    // a window too large to represent reaches back to the start of history
    let cutoff = chrono::Duration::from_std(window)
        .ok()
        .and_then(|w| now.checked_sub_signed(w))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let start = history
        .iter()
        .find(|s| s.captured_at >= cutoff)
        .ok_or(RangeError::EmptyWindow)?;
    let end = history.last().ok_or(RangeError::EmptyWindow)?;

    Ok((start, end))
}

fn sales_rows(start: &[Article], end: &[Article]) -> Vec<SalesRow> {
    let end_index: HashMap<&str, &Article> =
        end.iter().map(|a| (a.code.as_str(), a)).collect();

    start
        .iter()
        .filter_map(|before| {
            let after = end_index.get(before.code.as_str())?;
            if after.available >= before.available {
                return None;
            }

            let units_sold = before.available - after.available;
            Some(SalesRow {
                code: before.code.clone(),
                description: before.description.clone(),
                group: before.group_name().map(str::to_string),
                unit_price: before.price,
                stock_start: before.available,
                stock_end: after.available,
                units_sold,
                revenue: units_sold as f64 * before.price,
            })
        })
        .collect()
}

/// Totals and top-N rankings over a ledger. Ties keep ledger order.
pub fn summarize(rows: &[SalesRow]) -> SalesSummary {
    let total_units = rows.iter().map(|r| r.units_sold).sum();
    let total_revenue = rows.iter().map(|r| r.revenue).sum();

    let mut groups: Vec<GroupSales> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|g| g.group == row.group) {
            Some(bucket) => bucket.units_sold += row.units_sold,
            None => groups.push(GroupSales {
                group: row.group.clone(),
                units_sold: row.units_sold,
            }),
        }
    }
    groups.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    groups.truncate(TOP_N);

    let mut by_units = rows.to_vec();
    by_units.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    by_units.truncate(TOP_N);

    let mut by_revenue = rows.to_vec();
    by_revenue.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    by_revenue.truncate(TOP_N);

    SalesSummary {
        total_units,
        total_revenue,
        top_groups: groups,
        top_by_units: by_units,
        top_by_revenue: by_revenue,
    }
}
