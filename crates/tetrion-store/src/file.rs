use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{KeyValueStore, StoreError};

/// Store backed by a single pretty-printed JSON object file.
///
/// The file is read once when opened and rewritten on every change. A
/// missing file is an empty store; a file that is not a JSON object of
/// strings is logged and treated as empty, and is replaced by the next write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open<P>(path: P) -> Result<Self, StoreError>
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("ignoring unreadable store file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("store file {} does not exist yet", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, key: &str, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|source| StoreError::Encode { source })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::from_io(key, parent.to_path_buf(), e))?;
        }
        fs::write(&self.path, json).map_err(|e| StoreError::from_io(key, self.path.clone(), e))
    }

    fn commit(
        &mut self,
        key: &str,
        entries: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        self.write(key, &entries)?;
        self.entries = entries;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_owned(), value.to_owned());
        self.commit(key, entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        let mut entries = self.entries.clone();
        entries.remove(key);
        self.commit(key, entries)
    }
}
