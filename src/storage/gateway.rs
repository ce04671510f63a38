//! Persistence gateway: maps the tracker's transactions, budget overrides and display
//! preference onto independent keys of a [`KeyValueStore`].

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::StorageSettings;
use crate::core::time::{Clock, SystemClock};
use crate::errors::StorageError;
use crate::ledger::{transaction, BudgetMap, Transaction};

use super::{KeyValueStore, MemoryStore, Result};

/// Snapshot of store usage taken after a write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageUsage {
    pub bytes_used: u64,
    pub quota: u64,
    pub warning_threshold: f64,
}

impl StorageUsage {
    pub fn percent(&self) -> f64 {
        self.bytes_used as f64 / self.quota as f64 * 100.0
    }

    pub fn is_near_quota(&self) -> bool {
        self.percent() > self.warning_threshold * 100.0
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsRecord {
    #[serde(default)]
    version: String,
    #[serde(default)]
    last_modified: i64,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

pub struct Persistence {
    store: Box<dyn KeyValueStore>,
    settings: StorageSettings,
    clock: Arc<dyn Clock>,
}

impl Persistence {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        settings: StorageSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            settings,
            clock,
        }
    }

    /// Gateway over a fresh [`MemoryStore`] with default settings.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryStore::new()),
            StorageSettings::default(),
            Arc::new(SystemClock),
        )
    }

    pub fn settings(&self) -> &StorageSettings {
        &self.settings
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn save_transactions(&mut self, transactions: &[Transaction]) -> Result<StorageUsage> {
        let record = TransactionsRecord {
            version: self.settings.schema_version.clone(),
            last_modified: self.clock.now().timestamp_millis(),
            transactions: transactions.to_vec(),
        };
        let bytes = serde_json::to_vec(&record)?;
        let key = self.settings.transactions_key.clone();
        self.write(&key, &bytes)
    }

    /// Loads the stored collection, or `None` when nothing was ever saved.
    ///
    /// Sort keys are re-derived from dates and the collection re-sorted, so hand-edited
    /// or legacy records come back in a consistent order.
    pub fn load_transactions(&self) -> Result<Option<Vec<Transaction>>> {
        let key = &self.settings.transactions_key;
        let Some(record) = self.read_json::<TransactionsRecord>(key)? else {
            return Ok(None);
        };
        self.ensure_supported_version(&record.version)?;

        let mut transactions = record.transactions;
        for txn in transactions.iter_mut() {
            txn.refresh_sort_key();
        }
        transaction::sort_newest_first(&mut transactions);
        tracing::debug!(count = transactions.len(), "loaded transactions");
        Ok(Some(transactions))
    }

    pub fn save_budgets(&mut self, budgets: &BudgetMap) -> Result<StorageUsage> {
        let bytes = serde_json::to_vec(budgets)?;
        let key = self.settings.budgets_key.clone();
        self.write(&key, &bytes)
    }

    /// Loads budget overrides, or `None` when the defaults apply. Entries with a
    /// non-positive limit are dropped.
    pub fn load_budgets(&self) -> Result<Option<BudgetMap>> {
        let key = &self.settings.budgets_key;
        let Some(mut budgets) = self.read_json::<BudgetMap>(key)? else {
            return Ok(None);
        };
        budgets.retain(|category, limit| {
            let keep = limit.is_finite() && *limit > 0.0;
            if !keep {
                tracing::warn!(category = %category, limit = *limit, "dropping invalid stored budget");
            }
            keep
        });
        Ok(Some(budgets))
    }

    pub fn clear_budgets(&mut self) -> Result<()> {
        let key = self.settings.budgets_key.clone();
        self.store.remove(&key)
    }

    pub fn save_dark_mode(&mut self, enabled: bool) -> Result<StorageUsage> {
        let bytes = serde_json::to_vec(&enabled)?;
        let key = self.settings.display_key.clone();
        self.write(&key, &bytes)
    }

    /// Display preference; `false` when never saved.
    pub fn load_dark_mode(&self) -> Result<bool> {
        let key = &self.settings.display_key;
        Ok(self.read_json::<bool>(key)?.unwrap_or(false))
    }

    pub fn usage(&self) -> Result<StorageUsage> {
        Ok(StorageUsage {
            bytes_used: self.store.bytes_used()?,
            quota: self.settings.quota_bytes,
            warning_threshold: self.settings.warning_threshold,
        })
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<StorageUsage> {
        let quota = self.settings.quota_bytes;
        let needed =
            self.store.bytes_used()? - self.store.entry_size(key)? + (key.len() + bytes.len()) as u64;
        if needed > quota {
            return Err(StorageError::QuotaExceeded { needed, quota });
        }
        self.store.set(key, bytes)?;

        let usage = self.usage()?;
        if usage.is_near_quota() {
            tracing::warn!(
                percent = usage.percent(),
                "storage usage is close to the quota; export your data to back it up"
            );
        }
        Ok(usage)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|err| {
            tracing::warn!(key, error = %err, "failed to decode stored record");
            StorageError::Corrupt(key.to_string())
        })
    }

    fn ensure_supported_version(&self, stored: &str) -> Result<()> {
        let major = |version: &str| version.split('.').next()?.trim().parse::<u32>().ok();
        match (major(stored), major(&self.settings.schema_version)) {
            (Some(found), Some(supported)) if found > supported => {
                Err(StorageError::UnsupportedVersion(stored.to_string()))
            }
            _ => Ok(()),
        }
    }
}
