pub mod file_backend;
pub mod gateway;
pub mod memory_backend;

use crate::errors::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable key-value byte store the tracker persists into.
///
/// Usage accounting follows browser local storage: every entry costs the length of
/// its key plus the length of its value.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;

    /// Bytes currently occupied by a single entry, zero when absent.
    fn entry_size(&self, key: &str) -> Result<u64> {
        Ok(self
            .get(key)?
            .map(|value| (key.len() + value.len()) as u64)
            .unwrap_or(0))
    }

    fn bytes_used(&self) -> Result<u64> {
        let mut total = 0;
        for key in self.keys()? {
            total += self.entry_size(&key)?;
        }
        Ok(total)
    }
}

pub use file_backend::FileStore;
pub use gateway::{Persistence, StorageUsage};
pub use memory_backend::MemoryStore;
