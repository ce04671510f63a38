use std::collections::BTreeMap;

use crate::errors::StorageError;

use super::{KeyValueStore, Result};

/// In-memory key-value store for ephemeral sessions and tests.
///
/// An optional hard capacity makes writes fail the way a full browser store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
    capacity: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if let Some(capacity) = self.capacity {
            let needed = self.bytes_used()? - self.entry_size(key)? + (key.len() + value.len()) as u64;
            if needed > capacity {
                return Err(StorageError::QuotaExceeded {
                    needed,
                    quota: capacity,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn entry_size(&self, key: &str) -> Result<u64> {
        Ok(self
            .entries
            .get(key)
            .map(|value| (key.len() + value.len()) as u64)
            .unwrap_or(0))
    }
}
