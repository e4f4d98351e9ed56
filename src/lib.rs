//! Inventory snapshot history and sales reconciliation.
//!
//! Readings of an inventory are stored as an append-only, deduplicated history
//! of snapshots. Each reading is also diffed against the previous one, and any
//! two stored snapshots can be reconciled into a sales ledger.

pub mod aggregate;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod source;
pub mod store;
pub mod util;
