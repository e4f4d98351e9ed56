//! Inventory data model.
//!
//! Articles are the unit compared across snapshots. A snapshot is an
//! immutable, timestamped capture of every article at one instant.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most recent reading of the inventory: code -> units available.
///
/// Overwritten on every observation, never appended.
pub type ObservedState = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(alias = "codigo")]
    pub code: String,
    #[serde(alias = "disponible")]
    pub available: u64,
    #[serde(alias = "precio", alias = "precioVenta")]
    pub price: f64,
    #[serde(default, alias = "grupo", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, alias = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Article {
    pub fn new(code: impl Into<String>, available: u64, price: f64) -> Self {
        Article {
            code: code.into(),
            available,
            price,
            group: None,
            description: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Group name, treating an empty string the same as no group.
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }

    /// Stock value of this line: units on hand times unit price.
    pub fn value(&self) -> f64 {
        self.available as f64 * self.price
    }
}

/// Returns the first code that appears more than once, if any.
pub fn find_duplicate_code(articles: &[Article]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(articles.len());
    articles
        .iter()
        .find(|a| !seen.insert(a.code.as_str()))
        .map(|a| a.code.as_str())
}

/// Returns the first article whose price is negative, NaN or infinite.
pub fn find_invalid_price(articles: &[Article]) -> Option<&Article> {
    articles
        .iter()
        .find(|a| !a.price.is_finite() || a.price < 0.0)
}

/// Reduces an article list to the code -> available map the diff engine works on.
pub fn observe(articles: &[Article]) -> ObservedState {
    articles
        .iter()
        .map(|a| (a.code.clone(), a.available))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Epoch milliseconds of the capture, unique within a history
    pub id: i64,
    pub captured_at: DateTime<Utc>,
    pub articles: Vec<Article>,
}

impl Snapshot {
    pub fn total_units(&self) -> u64 {
        self.articles.iter().map(|a| a.available).sum()
    }

    pub fn resumen(&self) -> Resumen {
        Resumen::tally(&self.articles)
    }
}

/// Grouped summary of the inventory: units per group plus the ungrouped remainder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resumen {
    pub total: u64,
    /// Groups in first-seen order
    #[serde(with = "ordered_groups")]
    pub por_grupo: Vec<(String, u64)>,
    pub sin_grupo: u64,
}

impl Resumen {
    /// Builds the summary from an article list, counting units in stock.
    pub fn tally(articles: &[Article]) -> Self {
        let mut por_grupo: Vec<(String, u64)> = Vec::new();
        let mut sin_grupo = 0u64;

        for article in articles {
            match article.group_name() {
                Some(name) => match por_grupo.iter_mut().find(|(g, _)| g == name) {
                    Some((_, count)) => *count += article.available,
                    None => por_grupo.push((name.to_string(), article.available)),
                },
                None => sin_grupo += article.available,
            }
        }

        let total = por_grupo.iter().map(|(_, c)| c).sum::<u64>() + sin_grupo;
        Resumen {
            total,
            por_grupo,
            sin_grupo,
        }
    }

    pub fn count_for(&self, group: &str) -> u64 {
        self.por_grupo
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }
}

/// Selects one group, or the articles that belong to none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    Named(String),
    Ungrouped,
}

impl GroupFilter {
    pub fn matches(&self, article: &Article) -> bool {
        match self {
            GroupFilter::Named(name) => article.group_name() == Some(name.as_str()),
            GroupFilter::Ungrouped => article.group_name().is_none(),
        }
    }
}

/// `porGrupo` is a json object on the wire; keep the object's key order.
mod ordered_groups {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(groups: &[(String, u64)], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for (group, count) in groups {
            map.serialize_entry(group, count)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, u64)>, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = Vec<(String, u64)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of group name to unit count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((group, count)) = access.next_entry::<String, u64>()? {
                    groups.push((group, count));
                }
                Ok(groups)
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}
