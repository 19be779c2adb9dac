use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::trace;
use zkart_fs::AtomicWriteOptions;

use crate::error::{Result, StoreError};
use crate::key::{validate_entry, validate_key};
use crate::ArtifactStore;

/// Directory-backed store; every write lands through a temp file and rename.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    /// Filesystem path of `key`, if it is a valid key.
    pub fn path_of(&self, key: &str) -> Result<PathBuf> { Ok(self.root.join(validate_key(key)?)) }
}

impl ArtifactStore for FsStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_of(key)?;
        tokio::fs::try_exists(&path).await.map_err(|source| StoreError::Read {
            key:    key.to_string(),
            source: zkart_fs::Error::Read { path, source },
        })
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let path = self.path_of(key)?;
        match tokio::task::spawn_blocking(move || zkart_fs::atomic_read(path)).await? {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn store(&self, dir: &str, key: &str, bytes: Bytes) -> Result<()> {
        let path = self.root.join(validate_entry(dir, key)?);
        trace!(path = %path.display(), len = bytes.len(), "writing artifact");

        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                zkart_fs::ensure_dir(parent)?;
            }
            zkart_fs::atomic_write(&path, &bytes, AtomicWriteOptions::new())
        })
        .await?
        .map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })
    }
}
