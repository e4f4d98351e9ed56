//! Snapshot storage.
//!
//! Persists the snapshot history and the last observed state through a
//! string-keyed storage backend, under two independent keys:
//! - `stocktake.snapshots`: the append-only history, oldest first
//! - `stocktake.last_observed`: code -> available of the latest reading
//!
//! Supports:
//! - Appending a snapshot, skipped when it matches the last stored one
//! - Listing all snapshots and looking one up by id
//! - Clearing the history in one step
//!
//! Unreadable or corrupt payloads are logged and read back as empty.

pub mod diff;
pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::error::{StorageError, StoreError};
use crate::model::{find_duplicate_code, find_invalid_price, Article, ObservedState, Snapshot};

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub const HISTORY_KEY: &str = "stocktake.snapshots";
pub const LAST_OBSERVED_KEY: &str = "stocktake.last_observed";

/// Minimal string-keyed storage. Each `set` overwrites a single key atomically.
pub trait KvStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Stored(Snapshot),
    /// Articles matched the last stored snapshot, nothing was written
    Unchanged,
}

impl AppendOutcome {
    pub fn stored(&self) -> bool {
        matches!(self, AppendOutcome::Stored(_))
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            AppendOutcome::Stored(snapshot) => Some(snapshot),
            AppendOutcome::Unchanged => None,
        }
    }
}

/// Snapshot history and last observed state over a storage backend.
/// Assumes a single writer.
pub struct SnapshotStore<S: KvStorage> {
    storage: S,
}

impl<S: KvStorage> SnapshotStore<S> {
    pub fn new(storage: S) -> Self {
        SnapshotStore { storage }
    }

    /// Append a snapshot of `articles` unless it matches the most recent one.
    pub fn append(&mut self, articles: Vec<Article>) -> Result<AppendOutcome, StoreError> {
        self.append_at(articles, Utc::now())
    }

    /// Same as [`append`](Self::append) with an explicit capture instant.
    pub fn append_at(
        &mut self,
        articles: Vec<Article>,
        now: DateTime<Utc>,
    ) -> Result<AppendOutcome, StoreError> {
        if let Some(code) = find_duplicate_code(&articles) {
            return Err(StoreError::DuplicateCode(code.to_string()));
        }
        if let Some(article) = find_invalid_price(&articles) {
            return Err(StoreError::InvalidPrice {
                code: article.code.clone(),
                price: article.price,
            });
        }

        let mut history = self.all();

        if let Some(last) = history.last() {
            if same_articles(&last.articles, &articles) {
                log::info!("inventory unchanged since snapshot {}, not stored", last.id);
                return Ok(AppendOutcome::Unchanged);
            }
        }

        let (id, captured_at) = next_stamp(history.last(), now);
        let snapshot = Snapshot {
            id,
            captured_at,
            articles,
        };

        history.push(snapshot.clone());
        let encoded = serde_json::to_string(&history)?;
        self.storage.set(HISTORY_KEY, &encoded)?;

        log::info!(
            "stored snapshot {} ({} articles, {} in history)",
            snapshot.id,
            snapshot.articles.len(),
            history.len()
        );

        Ok(AppendOutcome::Stored(snapshot))
    }

    /// Full history, oldest first. Empty when nothing is stored or the payload is corrupt.
    pub fn all(&self) -> Vec<Snapshot> {
        self.read_or_default(HISTORY_KEY, "snapshot history")
    }

    pub fn get(&self, id: i64) -> Option<Snapshot> {
        self.all().into_iter().find(|s| s.id == id)
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.all().pop()
    }

    /// Drop the whole history. The last observed state is kept.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.storage.set(HISTORY_KEY, "[]")?;
        log::info!("snapshot history cleared");
        Ok(())
    }

    pub fn load_last_observed(&self) -> ObservedState {
        self.read_or_default(LAST_OBSERVED_KEY, "last observed state")
    }

    pub fn save_last_observed(&mut self, state: &ObservedState) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(state)?;
        self.storage.set(LAST_OBSERVED_KEY, &encoded)?;
        Ok(())
    }

    fn read_or_default<T>(&self, key: &str, what: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                log::warn!("could not read {what}, starting empty: {e}");
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("{what} is corrupt, starting empty: {e}");
            T::default()
        })
    }
}

/// Order-independent content equality of two article lists.
///
/// Both lists are compared sorted by code; a missing group or description
/// compares equal to an empty one.
pub fn same_articles(a: &[Article], b: &[Article]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut a: Vec<&Article> = a.iter().collect();
    let mut b: Vec<&Article> = b.iter().collect();
    a.sort_by(|x, y| x.code.cmp(&y.code));
    b.sort_by(|x, y| x.code.cmp(&y.code));

    a.iter().zip(&b).all(|(x, y)| same_article(x, y))
}

fn same_article(x: &Article, y: &Article) -> bool {
    x.code == y.code
        && x.available == y.available
        && x.price == y.price
        && x.group.as_deref().unwrap_or("") == y.group.as_deref().unwrap_or("")
        && x.description.as_deref().unwrap_or("") == y.description.as_deref().unwrap_or("")
}

/// Id and capture time for the next snapshot, never behind the previous one.
fn next_stamp(previous: Option<&Snapshot>, now: DateTime<Utc>) -> (i64, DateTime<Utc>) {
    let id = now.timestamp_millis();
    match previous {
        Some(last) => (id.max(last.id.saturating_add(1)), now.max(last.captured_at)),
        None => (id, now),
    }
}
