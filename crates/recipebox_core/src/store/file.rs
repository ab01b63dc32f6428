//! JSON-file-backed store.
//!
//! A [`MemoryStore`] whose tree is loaded from a JSON file on open and
//! written back on every write. The file is rewritten before the new tree
//! is committed, so a write that cannot be saved is not applied and no
//! listener hears of it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::memory::MemoryStore;
use super::registry::{ErrorCallback, SnapshotCallback, SubscriptionId};
use super::{CollectionStore, StorePath, StoreResult};
use crate::error::RecipeBoxError;

/// A store persisted as a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let root = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Value::Null,
            Ok(contents) => {
                let value: Value = serde_json::from_str(&contents)?;
                if !(value.is_object() || value.is_null()) {
                    return Err(RecipeBoxError::InvalidStoreFile(path));
                }
                value
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Value::Null,
            Err(e) => {
                return Err(RecipeBoxError::FileRead {
                    path: path.clone(),
                    source: e,
                });
            }
        };

        log::debug!("JsonFileStore: opened {:?}", path);
        Ok(Self {
            path,
            memory: MemoryStore::from_value(root),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory tree behind this store.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    fn persist(&self, tree: &Value) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| RecipeBoxError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let contents = match tree {
            Value::Null => serde_json::to_string_pretty(&Value::Object(Default::default()))?,
            tree => serde_json::to_string_pretty(tree)?,
        };
        fs::write(&self.path, contents).map_err(|e| RecipeBoxError::FileWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl CollectionStore for JsonFileStore {
    fn subscribe(
        &self,
        path: &StorePath,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> SubscriptionId {
        self.memory.subscribe(path, on_snapshot, on_error)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.memory.unsubscribe(id)
    }

    fn set(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        self.memory.write_checked(path, value, |tree| self.persist(tree))
    }

    fn remove(&self, path: &StorePath) -> StoreResult<()> {
        self.memory.write_checked(path, Value::Null, |tree| self.persist(tree))
    }

    fn get(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        self.memory.get(path)
    }
}
