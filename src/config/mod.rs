use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::errors::TrackerError;
use crate::storage::file_backend::write_file_atomic;
use crate::utils::paths;

pub const CONFIG_FILE: &str = "config.json";

/// Key names and capacity limits used by the persistence gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub transactions_key: String,
    pub budgets_key: String,
    pub display_key: String,
    pub schema_version: String,
    pub quota_bytes: u64,
    /// Fraction of `quota_bytes` above which a save reports near-quota usage.
    pub warning_threshold: f64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            transactions_key: "bucks2bar_data".into(),
            budgets_key: "bucks2bar_budgets".into(),
            display_key: "bucks2bar_dark_mode".into(),
            schema_version: "1.0".into(),
            quota_bytes: 5 * 1024 * 1024,
            warning_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub seed_demo_data: bool,
    pub storage: StorageSettings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "info".into(),
            seed_demo_data: true,
            storage: StorageSettings::default(),
        }
    }
}

impl TrackerConfig {
    /// Directory holding the key-value store entries.
    pub fn store_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| paths::store_dir_in(base))
    }

    fn validate(&self) -> Result<(), TrackerError> {
        let storage = &self.storage;
        if storage.quota_bytes == 0 {
            return Err(TrackerError::Config("quota_bytes must be positive".into()));
        }
        if !(0.0..=1.0).contains(&storage.warning_threshold) {
            return Err(TrackerError::Config(
                "warning_threshold must be between 0 and 1".into(),
            ));
        }
        let keys = [
            &storage.transactions_key,
            &storage.budgets_key,
            &storage.display_key,
        ];
        if keys.iter().any(|key| key.trim().is_empty()) {
            return Err(TrackerError::Config("storage keys must not be empty".into()));
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(TrackerError::Config("storage keys must be distinct".into()));
        }
        Ok(())
    }
}

/// Reads and writes the JSON configuration file in the application data directory.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        let path = base.join(CONFIG_FILE);
        Self { base, path }
    }

    pub fn load(&self) -> Result<TrackerConfig, TrackerError> {
        if !self.path.exists() {
            return Ok(TrackerConfig::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: TrackerConfig = serde_json::from_str(&data).map_err(|err| {
            TrackerError::Config(format!("{}: {err}", self.path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &TrackerConfig) -> Result<(), TrackerError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_file_atomic(&self.path, json.as_bytes())?;
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
