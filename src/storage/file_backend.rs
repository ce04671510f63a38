use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::errors::StorageError;

use super::{KeyValueStore, Result};

const ENTRY_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Key-value store keeping one file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{ENTRY_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.entry_path(key)?;
        write_file_atomic(&path, value)?;
        tracing::debug!(key, bytes = value.len(), "wrote store entry");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_key(stem).is_ok() {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn entry_size(&self, key: &str) -> Result<u64> {
        let path = self.entry_path(key)?;
        match fs::metadata(path) {
            Ok(meta) => Ok(key.len() as u64 + meta.len()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keys become file names, so only ASCII letters, digits, `_` and `-` are allowed.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Stages `data` next to `path` and renames it into place.
pub(crate) fn write_file_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (FileStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::new(temp.path().join("store")).expect("file store");
        (store, temp)
    }

    #[test]
    fn set_get_remove_roundtrip() {
        let (mut store, _guard) = store_with_temp_dir();
        assert_eq!(store.get("bucks2bar_data").unwrap(), None);

        store.set("bucks2bar_data", b"[1,2,3]").unwrap();
        assert_eq!(
            store.get("bucks2bar_data").unwrap().as_deref(),
            Some(&b"[1,2,3]"[..])
        );
        assert_eq!(store.keys().unwrap(), ["bucks2bar_data"]);

        store.remove("bucks2bar_data").unwrap();
        assert_eq!(store.get("bucks2bar_data").unwrap(), None);
        store.remove("bucks2bar_data").expect("removing twice is fine");
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (mut store, _guard) = store_with_temp_dir();
        store.set("prefs", b"true").unwrap();
        store.set("prefs", b"false").unwrap();
        let names: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["prefs.json"]);
    }

    #[test]
    fn bytes_used_counts_keys_and_values() {
        let (mut store, _guard) = store_with_temp_dir();
        store.set("a", b"1234").unwrap();
        store.set("bb", b"12").unwrap();
        assert_eq!(store.bytes_used().unwrap(), 1 + 4 + 2 + 2);
    }

    #[test]
    fn rejects_path_like_keys() {
        let (mut store, _guard) = store_with_temp_dir();
        let err = store.set("../escape", b"x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)), "{err:?}");
    }
}
