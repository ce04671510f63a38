use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the tracker core, storage and import layers.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Format error: {0}")]
    Format(String),
    #[error("Transaction not found: {0}")]
    NotFound(String),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Persistence error: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, TrackerError>;

/// Failures raised by the key-value persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage quota exceeded: {needed} bytes needed, {quota} bytes available")]
    QuotaExceeded { needed: u64, quota: u64 },
    #[error("stored record `{0}` is corrupt")]
    Corrupt(String),
    #[error("stored record uses unsupported schema version {0}")]
    UnsupportedVersion(String),
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Storage(StorageError::Io(err))
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Storage(StorageError::Serde(err))
    }
}

impl TrackerError {
    /// Persistence failures do not roll back the in-memory mutation that preceded them.
    pub fn is_storage(&self) -> bool {
        matches!(self, TrackerError::Storage(_))
    }
}
