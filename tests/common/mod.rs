#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use bucks_core::{
    config::StorageSettings,
    core::{FixedClock, SequentialIds, SessionStart, TransactionStore},
    storage::{FileStore, MemoryStore, Persistence},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

/// Clock pinned to 2026-02-15, inside the demo data range.
pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::on(date("2026-02-15")))
}

pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn memory_store() -> TransactionStore {
    let clock = fixed_clock();
    let persistence = Persistence::new(
        Box::new(MemoryStore::new()),
        StorageSettings::default(),
        clock.clone(),
    );
    TransactionStore::new(persistence, clock, Arc::new(SequentialIds::new()))
}

pub fn seeded_memory_store() -> TransactionStore {
    let clock = fixed_clock();
    let persistence = Persistence::new(
        Box::new(MemoryStore::new()),
        StorageSettings::default(),
        clock.clone(),
    );
    let (store, start) =
        TransactionStore::hydrate_or_seed(persistence, clock, Arc::new(SequentialIds::new()), true)
            .expect("seed demo data");
    assert_eq!(start, SessionStart::Seeded { count: 8 });
    store
}

/// Opens a session over a file-backed store rooted at `dir`.
pub fn open_file_store(
    dir: &Path,
    seed_demo_data: bool,
) -> bucks_core::Result<(TransactionStore, SessionStart)> {
    let clock = fixed_clock();
    let backend = FileStore::new(dir)?;
    let persistence = Persistence::new(Box::new(backend), StorageSettings::default(), clock.clone());
    TransactionStore::hydrate_or_seed(persistence, clock, Arc::new(SequentialIds::new()), seed_demo_data)
}
