#![doc(test(attr(deny(warnings))))]

//! Bucks Core keeps a personal income and expense ledger: an ordered transaction
//! store persisted to a key-value backend, insight aggregations for summaries,
//! charts and budgets, and CSV/JSON import and export.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use crate::core::{SessionStart, TransactionStore};
pub use errors::{Result, StorageError, TrackerError};

/// Initializes global tracing with the default `bucks_core=info` directive.
pub fn init() {
    utils::init_tracing(None);
    tracing::debug!("bucks_core tracing initialized");
}
