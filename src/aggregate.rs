//! Dashboard statistics over a resumen or an article list.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Article, GroupFilter, Resumen};
use crate::reconcile::TOP_N;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCounts {
    pub total_stock: u64,
    pub num_groups: usize,
    pub top_group: Option<String>,
    pub top_group_count: u64,
    pub pct_sin_grupo: u64,
}

/// Totals over per-group counts plus the ungrouped remainder.
///
/// The total includes the ungrouped count. On a tie for the top group the
/// first one seen wins.
pub fn group_counts<'a, I>(por_grupo: I, sin_grupo: u64) -> GroupCounts
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut counts = GroupCounts::default();

    for (group, count) in por_grupo {
        counts.num_groups += 1;
        counts.total_stock += count;
        if counts.top_group.is_none() || count > counts.top_group_count {
            counts.top_group = Some(group.to_string());
            counts.top_group_count = count;
        }
    }

    counts.total_stock += sin_grupo;
    if counts.total_stock > 0 {
        counts.pct_sin_grupo = (100.0 * sin_grupo as f64 / counts.total_stock as f64).round() as u64;
    }

    counts
}

pub fn resumen_counts(resumen: &Resumen) -> GroupCounts {
    group_counts(
        resumen.por_grupo.iter().map(|(g, c)| (g.as_str(), *c)),
        resumen.sin_grupo,
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    pub stock_total: u64,
    pub valor_total: f64,
    pub precio_medio: f64,
    pub top_by_stock: Vec<Article>,
}

/// Stock, value and average price of the articles in one group.
///
/// Only articles listed in `codes_in_group` and matching `filter` count.
pub fn group_detail(articles: &[Article], filter: &GroupFilter, codes_in_group: &[String]) -> GroupDetail {
    let codes: HashSet<&str> = codes_in_group.iter().map(String::as_str).collect();
    let selected: Vec<&Article> = articles
        .iter()
        .filter(|a| codes.contains(a.code.as_str()) && filter.matches(a))
        .collect();

    if selected.is_empty() {
        return GroupDetail::default();
    }

    let stock_total = selected.iter().map(|a| a.available).sum();
    let valor_total = selected.iter().map(|a| a.value()).sum();
    let precio_medio = selected.iter().map(|a| a.price).sum::<f64>() / selected.len() as f64;

    let mut by_stock = selected;
    by_stock.sort_by(|a, b| b.available.cmp(&a.available));
    let top_by_stock = by_stock.into_iter().take(TOP_N).cloned().collect();

    GroupDetail {
        stock_total,
        valor_total,
        precio_medio,
        top_by_stock,
    }
}

/// Sum of units times price over `articles`.
pub fn inventory_value(articles: &[Article]) -> f64 {
    articles.iter().map(Article::value).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountDelta {
    pub label: String,
    pub before: u64,
    pub after: u64,
    pub delta: i64,
}

impl CountDelta {
    fn new(label: impl Into<String>, before: u64, after: u64) -> Self {
        CountDelta {
            label: label.into(),
            before,
            after,
            delta: after as i64 - before as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenComparison {
    pub groups: Vec<CountDelta>,
    pub total: CountDelta,
    pub sin_grupo: CountDelta,
}

/// Group-by-group comparison of two resumens. A group missing on one side counts as 0.
pub fn compare_resumen(before: &Resumen, after: &Resumen) -> ResumenComparison {
    let mut names: Vec<&str> = before.por_grupo.iter().map(|(g, _)| g.as_str()).collect();
    for (group, _) in &after.por_grupo {
        if !names.contains(&group.as_str()) {
            names.push(group);
        }
    }

    let groups = names
        .into_iter()
        .map(|g| CountDelta::new(g, before.count_for(g), after.count_for(g)))
        .collect();

    ResumenComparison {
        groups,
        total: CountDelta::new("total", before.total, after.total),
        sin_grupo: CountDelta::new("sin grupo", before.sin_grupo, after.sin_grupo),
    }
}
