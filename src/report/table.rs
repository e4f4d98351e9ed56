//! Plain-text tables for terminal output.

use crate::capture::CaptureReport;
use crate::reconcile::Reconciliation;
use crate::util::{format_int, format_money, format_signed, format_timestamp, truncate};

use super::{ComparisonView, HistoryRow, StatsView};

pub fn render_capture(report: &CaptureReport) -> String {
    let mut output = String::new();
    let diff = &report.diff;

    if diff.is_empty() {
        output.push_str("No changes since the last reading.\n");
    } else {
        for reduction in &diff.reduced {
            output.push_str(&format!(
                "  [sold?] {} {} -> {} (-{})\n",
                reduction.code,
                format_int(reduction.before),
                format_int(reduction.after),
                format_int(reduction.units())
            ));
        }
        for code in &diff.added {
            output.push_str(&format!("  [new] {code}\n"));
        }
        for code in &diff.removed {
            output.push_str(&format!("  [gone] {code}\n"));
        }
    }

    output.push('\n');
    match report.snapshot_id {
        Some(id) => output.push_str(&format!("Snapshot {id} stored.\n")),
        None => output.push_str("Inventory unchanged since the last snapshot, nothing stored.\n"),
    }
    output.push_str(&format!(
        "total units: {}  ungrouped: {}\n",
        format_int(report.resumen.total),
        format_int(report.resumen.sin_grupo)
    ));

    output
}

pub fn render_history(rows: &Vec<HistoryRow>) -> String {
    if rows.is_empty() {
        return String::from("No snapshots stored yet. Run 'stocktake capture' to create one.\n");
    }

    let mut output = format!(
        "{:<15} {:<20} {:>9} {:>11} {:>10} {:>14}\n",
        "ID", "Date", "Articles", "Units", "Ungrouped", "Value"
    );
    output.push_str(&"-".repeat(84));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:<15} {:<20} {:>9} {:>11} {:>10} {:>14}\n",
            row.id,
            format_timestamp(row.captured_at),
            format_int(row.articles as u64),
            format_int(row.total_units),
            format_int(row.sin_grupo),
            format_money(row.value)
        ));
    }

    output
}

pub fn render_ledger(result: &Reconciliation) -> String {
    let mut output = format!(
        "\nSales from #{} ({}) to #{} ({})\n\n",
        result.start_id,
        format_timestamp(result.start_at),
        result.end_id,
        format_timestamp(result.end_at)
    );

    if result.rows.is_empty() {
        output.push_str("No sales detected.\n");
        return output;
    }

    output.push_str(&format!(
        "{:<12} {:<28} {:<14} {:>10} {:>8} {:>8} {:>8} {:>12}\n",
        "Code", "Description", "Group", "Price", "Start", "End", "Sold", "Revenue"
    ));
    output.push_str(&"-".repeat(108));
    output.push('\n');

    for row in &result.rows {
        output.push_str(&format!(
            "{:<12} {:<28} {:<14} {:>10} {:>8} {:>8} {:>8} {:>12}\n",
            truncate(&row.code, 12),
            truncate(row.description.as_deref().unwrap_or("-"), 28),
            truncate(row.group.as_deref().unwrap_or("-"), 14),
            format_money(row.unit_price),
            format_int(row.stock_start),
            format_int(row.stock_end),
            format_int(row.units_sold),
            format_money(row.revenue)
        ));
    }

    let summary = &result.summary;
    output.push_str(&format!(
        "\nTOTAL SOLD: {} units, {} EUR\n",
        format_int(summary.total_units),
        format_money(summary.total_revenue)
    ));

    output.push_str("\nTop groups:\n");
    for group in &summary.top_groups {
        output.push_str(&format!(
            "  {:<20} {:>8}\n",
            group.group.as_deref().unwrap_or("(ungrouped)"),
            format_int(group.units_sold)
        ));
    }

    output.push_str("\nTop articles by units:\n");
    for row in &summary.top_by_units {
        output.push_str(&format!("  {:<20} {:>8}\n", row.code, format_int(row.units_sold)));
    }

    output.push_str("\nTop articles by revenue:\n");
    for row in &summary.top_by_revenue {
        output.push_str(&format!("  {:<20} {:>12}\n", row.code, format_money(row.revenue)));
    }

    output
}

pub fn render_comparison(view: &ComparisonView) -> String {
    let comparison = &view.comparison;
    let mut output = format!(
        "Comparing snapshots:\n  From: #{} ({})\n  To:   #{} ({})\n\n",
        view.from_id,
        format_timestamp(view.from_captured_at),
        view.to_id,
        format_timestamp(view.to_captured_at)
    );
    output.push_str(&format!("{:<24} {:>10} {:>10} {:>10}\n", "Group", "Before", "After", "Change"));
    output.push_str(&"-".repeat(57));
    output.push('\n');

    for row in comparison.groups.iter().chain([&comparison.total, &comparison.sin_grupo]) {
        output.push_str(&format!(
            "{:<24} {:>10} {:>10} {:>10}\n",
            truncate(&row.label, 24),
            format_int(row.before),
            format_int(row.after),
            format_signed(row.delta)
        ));
    }

    output
}

pub fn render_stats(view: &StatsView) -> String {
    let counts = &view.counts;
    let mut output = format!(
        "Snapshot #{} ({})\n\n",
        view.snapshot_id,
        format_timestamp(view.captured_at)
    );

    output.push_str(&format!("  total units:      {}\n", format_int(counts.total_stock)));
    output.push_str(&format!("  groups:           {}\n", counts.num_groups));
    if let Some(top) = &counts.top_group {
        output.push_str(&format!(
            "  top group:        {top} ({})\n",
            format_int(counts.top_group_count)
        ));
    }
    output.push_str(&format!("  ungrouped:        {}%\n", counts.pct_sin_grupo));
    output.push_str(&format!("  inventory value:  {} EUR\n", format_money(view.inventory_value)));

    if let Some(group) = &view.group {
        let detail = &group.detail;
        output.push_str(&format!("\n{}:\n", group.label));
        output.push_str(&format!("  units:            {}\n", format_int(detail.stock_total)));
        output.push_str(&format!("  value:            {} EUR\n", format_money(detail.valor_total)));
        output.push_str(&format!("  average price:    {} EUR\n", format_money(detail.precio_medio)));
        for article in &detail.top_by_stock {
            output.push_str(&format!(
                "    {:<20} {:>8}\n",
                article.code,
                format_int(article.available)
            ));
        }
    }

    output
}
