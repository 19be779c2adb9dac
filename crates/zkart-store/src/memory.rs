use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::Result;
use crate::key::{validate_entry, validate_key};
use crate::ArtifactStore;

/// In-process store. Entries live until [`MemoryStore::clear`] or drop; there
/// is no eviction and no expiry.
///
/// Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&self) { self.entries.write().clear(); }

    pub fn len(&self) -> usize { self.entries.read().len() }

    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ArtifactStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.entries.read().contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        validate_key(key)?;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn store(&self, dir: &str, key: &str, bytes: Bytes) -> Result<()> {
        validate_entry(dir, key)?;
        self.entries.write().insert(key.to_string(), bytes);
        Ok(())
    }
}
